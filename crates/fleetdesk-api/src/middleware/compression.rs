//! Response compression layer.

use tower_http::compression::CompressionLayer;

/// Builds a compression layer (gzip). CSV exports and long lists compress well.
pub fn build_compression_layer() -> CompressionLayer {
    CompressionLayer::new()
}

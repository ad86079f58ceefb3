#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("render target must be non empty, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("frame has {0} triangles, more than a depth buffer cell can index")]
    TooManyTriangles(usize),
    #[error("failed to build the rasterizer worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Built-in heavy node classes, in display order.
///
/// Users can extend or replace this list from the editor; a reset
/// restores it.
pub const RENDER_INTENSIVE_NODES: [&str; 11] = [
    // Retiming
    "Kronos",
    "OFlow2",
    "TimeBlur",
    // Motion blur
    "MotionBlur",
    "MotionBlur3D",
    "VectorBlur2",
    // Defocus / bokeh
    "Defocus",
    "ZDefocus2",
    "Convolve2",
    // Denoise
    "Denoise2",
    // Deep
    "DeepRecolor",
];

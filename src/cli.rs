use clap::Parser;

/// Deployment-time configuration. Nothing here is request-time input.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// ONNX model path
    #[arg(long, default_value = "./models/MulticlassRecycool.onnx")]
    pub model: String,

    /// Optional labels file, one class name per line; defaults to the
    /// built-in vocabulary the bundled model was trained on
    #[arg(long)]
    pub labels: Option<String>,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Bind port
    #[arg(long, default_value_t = 5000)]
    pub port: u16,

    /// Run inference on the CUDA execution provider
    #[arg(long, default_value_t = false)]
    pub cuda: bool,
}

use gl_core::Node;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
	Human,
	Json,
}

pub struct Context {
	pub node: Node,
	pub format: OutputFormat,
}

impl Context {
	pub fn new(node: Node, format: OutputFormat) -> Self {
		Self { node, format }
	}
}

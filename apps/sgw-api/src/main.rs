use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = sgw_api::Args::parse();
	sgw_api::run(args).await
}

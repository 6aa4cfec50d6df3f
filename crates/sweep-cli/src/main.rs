mod cli;
mod token_store;

fn main() -> anyhow::Result<()> {
    cli::run()
}

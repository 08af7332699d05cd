use clap::Parser;

fn main() -> anyhow::Result<()> {
    cardsync::run(cardsync::Cli::parse())
}

use mapwater::cli::bake::run_bake_cli;

fn main() -> anyhow::Result<()> {
    run_bake_cli()
}

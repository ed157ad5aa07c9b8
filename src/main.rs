fn main() -> miette::Result<()> {
    gauntlet::cli::run()
}

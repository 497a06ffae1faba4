fn main() -> anyhow::Result<()> {
    otpi_app::run()
}

fn main() -> anyhow::Result<()> {
    mclang::run()
}

fn main() -> anyhow::Result<()> {
    phoenix_vale::run_scene()
}

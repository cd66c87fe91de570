fn main() -> anyhow::Result<()> {
    yogascreen_lib::run()
}

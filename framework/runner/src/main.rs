fn main() -> anyhow::Result<()> {
    let cli = stress_harness_runner::init();

    stress_harness_runner::run(cli)
}

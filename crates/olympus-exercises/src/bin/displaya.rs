//! Driver for the displaya exercise

use olympus_exercises::displaya;

fn main() -> anyhow::Result<()> {
    olympus_exercises::run(
        displaya::EXERCISE,
        displaya::programs(student::displaya::main),
        displaya::drive,
    )
}

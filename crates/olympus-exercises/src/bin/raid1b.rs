//! Driver for the raid1b exercise

use minos::Dispatcher;
use olympus_exercises::raid1b;

fn main() -> anyhow::Result<()> {
    olympus_exercises::run(raid1b::EXERCISE, Dispatcher::default(), |harness| {
        raid1b::drive(harness, student::raid1b)
    })
}

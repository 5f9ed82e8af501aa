//! displaya: print the first `a` of the only argument

use std::io::Write;

use minos::{Argv, Dispatcher, Harness, HarnessResult, ProgramRegistry, outln, random};

pub const EXERCISE: &str = "displaya";
pub const PROGRAM: &str = "displaya";

/// Reference solution. Prints `a` whether or not the single argument
/// contains one, and as the usage message for any other argument count.
pub fn displaya(args: &[String]) {
    let first_a = match args {
        [word] => word.chars().find(|&c| c == 'a'),
        _ => None,
    };
    outln!("{}", first_a.unwrap_or('a'));
}

/// Reference and candidate registries for this exercise
pub fn programs<F>(candidate: F) -> Dispatcher
where
    F: Fn(&[String]) + Send + Sync + 'static,
{
    Dispatcher::new(
        ProgramRegistry::new().with(PROGRAM, displaya),
        ProgramRegistry::new().with(PROGRAM, candidate),
    )
}

/// Random word lists, fixed strings, and two explicit arguments
pub fn table() -> Vec<Argv> {
    let mut lines = random::mult_rand_words();
    lines.extend(["dsfda", "", "1", "1"].map(String::from));

    let mut table: Vec<Argv> = lines
        .iter()
        .map(|line| line.split_whitespace().collect())
        .collect();
    table.push(Argv::new(["1", "a"]));
    table
}

/// Run the whole table through the registered programs
pub fn drive<W: Write>(harness: &mut Harness<W>) -> HarnessResult<()> {
    for argv in table() {
        harness.challenge_main(PROGRAM, argv.0)?;
    }
    Ok(())
}

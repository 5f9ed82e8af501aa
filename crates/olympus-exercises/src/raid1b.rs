//! raid1b: draw a framed rectangle

use std::io::Write;

use minos::{Callable, Harness, HarnessResult, TestTable, out, outln, random};

pub const EXERCISE: &str = "raid1b";
pub const LABEL: &str = "Raid1b";

/// Reference solution. Non-positive dimensions draw nothing.
pub fn raid1b(x: i64, y: i64) {
    if x < 1 || y < 1 {
        return;
    }
    draw_line(x, b"/*\\");
    for _ in 2..y {
        draw_line(x, b"* *");
    }
    if y > 1 {
        draw_line(x, b"\\*/");
    }
}

fn draw_line(x: i64, &[begin, middle, end]: &[u8; 3]) {
    out!("{}", begin as char);
    for _ in 2..x {
        out!("{}", middle as char);
    }
    if x > 1 {
        out!("{}", end as char);
    }
    outln!();
}

/// Subject examples, degenerate sizes and one random valid size
pub fn table() -> HarnessResult<TestTable<(i64, i64)>> {
    let mut table: TestTable<(i64, i64)> = [(5, 3), (5, 1), (1, 1), (1, 5)].into_iter().collect();
    table.extend([(0, 0), (-1, 6), (6, -1)]);
    table.extend([(
        random::rand_int_between(1, 20)?,
        random::rand_int_between(1, 20)?,
    )]);
    Ok(table)
}

/// Run the whole table against `candidate`
pub fn drive<W, C>(harness: &mut Harness<W>, candidate: C) -> HarnessResult<()>
where
    W: Write,
    C: Callable<(i64, i64), Output = ()>,
{
    harness.challenge_table(LABEL, raid1b, candidate, &table()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use minos::{Config, Verdict, capture};

    fn drawn(x: i64, y: i64) -> String {
        capture(|| raid1b(x, y)).text().into_owned()
    }

    #[test]
    fn test_reference_shapes() {
        assert_eq!(drawn(5, 3), "/***\\\n*   *\n\\***/\n");
        assert_eq!(drawn(5, 1), "/***\\\n");
        assert_eq!(drawn(1, 1), "/\n");
        assert_eq!(drawn(1, 5), "/\n*\n*\n*\n\\\n");
        assert_eq!(drawn(3, 3), "/*\\\n* *\n\\*/\n");
    }

    #[test]
    fn test_reference_degenerate_sizes() {
        assert_eq!(drawn(0, 0), "");
        assert_eq!(drawn(-1, 6), "");
        assert_eq!(drawn(6, -1), "");
    }

    #[test]
    fn test_table_shape() {
        let _guard = crate::random_lock();
        let table = table().unwrap();
        assert_eq!(table.len(), 8);
        let (x, y) = *table.iter().last().unwrap().args();
        assert!((1..=20).contains(&x) && (1..=20).contains(&y));
    }

    #[test]
    fn test_student_passes() {
        let _guard = crate::random_lock();
        let mut harness = Harness::with_writer(EXERCISE, &Config::default(), Vec::new());
        drive(&mut harness, student::raid1b).unwrap();
        assert!(harness.summary().all_matched());
        assert_eq!(harness.summary().total, 8);
    }

    #[test]
    fn test_broken_candidate_is_caught() {
        fn no_middle(x: i64, y: i64) {
            raid1b(x, y.min(2));
        }

        let mut harness = Harness::with_writer(EXERCISE, &Config::default(), Vec::new());
        let verdict = harness.challenge(LABEL, raid1b, no_middle, (5_i64, 3_i64)).unwrap();
        assert_eq!(verdict, Verdict::Mismatch);
        let report = String::from_utf8_lossy(harness.writer()).into_owned();
        assert!(report.contains("  -*   *\n"));
    }
}

use minos::outln;

/// Print `a` followed by a newline, whatever the arguments.
pub fn main(args: &[String]) {
    if args.len() == 1 {
        if let Some(a) = args[0].chars().find(|c| *c == 'a') {
            outln!("{}", a);
            return;
        }
    }
    outln!("a");
}

//! Scenario commands backing the CLI's subcommands.

pub mod scenario;

/// Every scenario name the CLI knows, in display order.
pub const ALL: &[&str] = &["basic-dispatch", "delegate-precedence", "cycle-tolerance", "initialize-order", "finalize-order", "copy-fidelity"];

/// Run a single scenario by name, returning its trace lines.
///
/// Panics if `name` isn't one of [`ALL`]; callers (the CLI's own
/// `clap::ValueEnum`) already restrict input to that set.
pub fn run(name: &str) -> Vec<String> {
    match name {
        "basic-dispatch" => scenario::basic_dispatch(),
        "delegate-precedence" => scenario::delegate_precedence(),
        "cycle-tolerance" => scenario::cycle_tolerance(),
        "initialize-order" => scenario::initialize_order(),
        "finalize-order" => scenario::finalize_order(),
        "copy-fidelity" => scenario::copy_fidelity(),
        other => panic!("unknown scenario: {other}"),
    }
}

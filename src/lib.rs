//! Fans shell commands out over a fleet of SSH hosts. Commands run one at a
//! time in file order; within a command all hosts run in parallel, and each
//! host's stdout is stored under `<output_dir>/<host>/<command>_<run time>.log`.

pub mod common;
pub mod dispatcher;

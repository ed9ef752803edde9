//! Context-insensitive, inclusion-based (Andersen-style) pointer analysis with
//! on-the-fly call graph construction.

mod heap;
mod pfg;
mod pointer;
mod points_to_set;
mod result;
mod solver;
mod worklist;

use std::path::{Path, PathBuf};

pub use heap::{AllocationSiteHeap, HeapModel, Obj, ObjId, ObjType};
pub use pfg::PointerFlowGraph;
pub use pointer::{Pointer, PointerId, Pointers};
pub use points_to_set::PointsToSet;
pub use result::{PointerAnalysisResult, ResultDisplay};
pub use solver::{Solver, SolverStats};
use thiserror::Error;
pub use worklist::WorkList;

use crate::{
    config::{self, Config, ConfigError},
    ir::Program,
    parse::{self, ParseError},
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub fn read_program(path: &Path) -> Result<Program, Error> {
    let code = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse::parse_program(&code)?)
}

pub fn analyze_path(
    path: &Path,
    conf: &Config,
) -> Result<(Program, PointerAnalysisResult), Error> {
    let program = read_program(path)?;
    let res = analyze(&program, conf)?;
    Ok((program, res))
}

pub fn analyze_str(code: &str, conf: &Config) -> Result<(Program, PointerAnalysisResult), Error> {
    let program = parse::parse_program(code)?;
    let res = analyze(&program, conf)?;
    Ok((program, res))
}

pub fn analyze(program: &Program, conf: &Config) -> Result<PointerAnalysisResult, Error> {
    let entry = config::entry_method(program, conf)?;
    tracing::info!("pointer analysis from {}", program.method_name(entry));
    Ok(Solver::new(program).solve(entry))
}

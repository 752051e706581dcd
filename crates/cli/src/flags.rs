use clap::ValueEnum;
use codescope_indexer::{AnalysisMode, ChunkFilter};

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum ModeFlag {
    Hybrid,
    Ast,
    Semantic,
}

impl ModeFlag {
    pub(crate) const fn as_domain(self) -> AnalysisMode {
        match self {
            ModeFlag::Hybrid => AnalysisMode::Hybrid,
            ModeFlag::Ast => AnalysisMode::Ast,
            ModeFlag::Semantic => AnalysisMode::Semantic,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum ChunkKindFlag {
    Semantic,
    Structural,
}

impl ChunkKindFlag {
    pub(crate) const fn as_domain(self) -> ChunkFilter {
        match self {
            ChunkKindFlag::Semantic => ChunkFilter::Semantic,
            ChunkKindFlag::Structural => ChunkFilter::Structural,
        }
    }
}

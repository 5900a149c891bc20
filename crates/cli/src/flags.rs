use arbitrem_navigator::IndicesLayout;
use clap::ValueEnum;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub(crate) enum IndicesLayoutFlag {
    PerAnchor,
    PerRecord,
}

impl IndicesLayoutFlag {
    pub(crate) const fn as_domain(self) -> IndicesLayout {
        match self {
            IndicesLayoutFlag::PerAnchor => IndicesLayout::PerAnchor,
            IndicesLayoutFlag::PerRecord => IndicesLayout::PerRecord,
        }
    }
}

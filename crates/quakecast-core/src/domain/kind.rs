use std::fmt::{Display, Formatter};

/// The two record domains served by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Seismic,
    Weather,
}

impl RecordKind {
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Seismic => "sismo_",
            Self::Weather => "clima_",
        }
    }

    /// Path segment the domain is served under.
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Seismic => "earthquakes",
            Self::Weather => "weather",
        }
    }

    /// Query parameter accepted in place of `location` on get-by-source.
    pub const fn location_alias(self) -> &'static str {
        match self {
            Self::Seismic => "country",
            Self::Weather => "city",
        }
    }

    pub const fn not_found_message(self) -> &'static str {
        match self {
            Self::Seismic => "seismic record not found",
            Self::Weather => "weather record not found",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.noun())
    }
}

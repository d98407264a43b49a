//! Application constants for the bulletin processor
//!
//! Marker strings that identify the regional bulletin layouts, output column
//! names, and default values shared by the configuration and the CLI.

// =============================================================================
// Plain-text (ZS) Bulletin Markers
// =============================================================================

/// Separator line that immediately precedes the data block
pub const ZS_START_MARKER: &str = ":-------------+--------------+---------+--------+--------+--------+---------+-------------------:--------:";

/// Separator line that immediately follows the data block (106 dashes)
pub const ZS_END_MARKER: &str = "----------------------------------------------------------------------------------------------------------";

/// Parts produced by splitting a data line on ':' (leading and trailing border included)
pub const ZS_SPLIT_PARTS: usize = 11;

/// Data fields between the borders
pub const ZS_DATA_FIELDS: usize = 9;

/// River-name abbreviation prefix ("р." for "река")
pub const ZS_RIVER_PREFIX: &str = "р.";

// =============================================================================
// Table Bulletin Markers
// =============================================================================

/// Admissible separators between river and station, in priority order
pub const NAME_DASHES: [char; 3] = ['—', '–', '-'];

/// First field of a repeated column-header row ("river")
pub const RIVER_HEADER: &str = "Река";

/// First field of the water-body table header once split and stripped
pub const WATER_BODY_HEADER: &str = "Водныйобъект";

/// Cell that marks an ice-state column in the I layout
pub const WATER_STATE_HEADER: &str = "Состояние водного объекта";

/// Water-level text of a gauge that did not report
pub const NO_CONNECTION: &str = "нет связи";

/// Closing confidentiality notice of the OI spreadsheet
pub const CONFIDENTIAL_NOTICE: &str = "Настоящая информация не подлежит разглашению в общем или частном порядке без предварительного согласования";

/// Sub-header text found in the OI "date" column
pub const OI_START_DATE_HEADER: &str = "начальная дата";

/// Ice text meaning "clear of ice"
pub const OI_CLEAR_ICE: &str = "Чисто";

/// Water levels above this value carry a spurious thousands digit
pub const WATER_LEVEL_DISPLAY_LIMIT: i64 = 999;

// =============================================================================
// Output Columns
// =============================================================================

pub mod columns {
    pub const STATION: &str = "Obs Point";
    pub const RIVER: &str = "River";
    pub const GEOMETRY: &str = "geometry";
    pub const WATER_LEVEL: &str = "Lvl 0 8_00";
    pub const WATER_LEVEL_CHANGE: &str = "Lvl Change";
    pub const ICE: &str = "Ice";
    pub const FLOOD_LEVEL: &str = "Flood Lvl";
    pub const FLOODPLAIN_LEVEL: &str = "Floodplain Lvl";
    pub const ICE_THICKNESS: &str = "Ice Thickn";
}

// =============================================================================
// Defaults
// =============================================================================

/// Placeholder written into attributes that received no observation
pub const DEFAULT_UNSET_SENTINEL: &str = "-";

/// Encoding tried when a text bulletin is not valid UTF-8
pub const DEFAULT_FALLBACK_ENCODING: &str = "windows-1251";

/// Capacity of the unmatched-record diagnostic channel
pub const DEFAULT_DIAGNOSTIC_BUFFER: usize = 1024;

/// Column names in the canonical reference file
pub const DEFAULT_REFERENCE_STATION_COLUMN: &str = "name";
pub const DEFAULT_REFERENCE_RIVER_COLUMN: &str = "river";
pub const DEFAULT_REFERENCE_GEOMETRY_COLUMN: &str = "geometry";

/// Prefix of editor lock files left next to open documents
pub const LOCK_FILE_PREFIX: &str = "~$";

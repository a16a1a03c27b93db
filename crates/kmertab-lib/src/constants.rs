//! Constants shared by the table builder, the tuple reader and the CLI

/// Label of the row-key column in the header
pub const DEFAULT_ROW_KEY_LABEL: &str = "Accessions";

/// Separator between fields of an emitted row
pub const FIELD_DELIMITER: char = ',';

/// Quote character used when identifiers are emitted RFC 4180 style
pub const QUOTE_CHAR: char = '"';

/// Characters that cannot appear unescaped inside an emitted field
pub const FORBIDDEN_IDENTIFIER_CHARS: &[char] = &[FIELD_DELIMITER, QUOTE_CHAR, '\n', '\r'];

/// Separator between the columns of a tuple input file
pub const TUPLE_FILE_SEPARATOR: char = '\t';

/// Leading character of a comment line in tuple and call files
pub const COMMENT_PREFIX: char = '#';

/// Dense grid size (entities x features) above which a scale warning is logged
pub const DEFAULT_SCALE_WARNING_CELLS: u64 = 100_000_000;

/// Number of tuples handed to one rayon task during parallel ingestion
pub const DEFAULT_PARALLEL_CHUNK_SIZE: usize = 1 << 16;

/// Seed for the composite-key hash map
pub const DEFAULT_SEED: u64 = 1;

/// Genotype value of a no-call allele
pub const NO_CALL_GENOTYPE: i32 = -1;

/// Version number
pub const VERSION: (u8, u8, u8) = (0, 1, 0);

/// Whether `id` can be written into a row without quoting
#[inline]
pub fn is_plain_identifier(id: &str) -> bool {
    !id.contains(FORBIDDEN_IDENTIFIER_CHARS)
}

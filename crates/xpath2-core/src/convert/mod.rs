//! Value Conversion Engine: canonical lexical forms, casting and the
//! function-conversion / `treat as` rules.

mod cast;
mod coerce;
mod lexical;
mod temporal;
mod xml_helpers;

pub use cast::{can_cast, cast_atomic, cast_between_schema_types};
pub use coerce::{treat_value_as, value_as};
pub use lexical::{format_decimal, format_double, format_float, to_canonical_lexical_form};

pub(crate) use xml_helpers::collapse_xml_whitespace;

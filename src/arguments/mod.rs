//! Declarative binding of command tokens onto typed argument structs.
//!
//! Every command declares its arguments once with a [`SchemaBuilder`]: numbered positions
//! (required, optional with a default, or variadic), keyword options, and enum groups of
//! mutually exclusive keywords. The compiled [`Schema`] is cached per struct in a
//! [`SchemaCell`] and turns a flat token array into a populated struct or an [`ArgumentError`].

mod argument_error;
mod coerce;
mod schema;

pub use argument_error::{ArgumentError, SchemaError};
pub use coerce::{coerce, CoerceError, FromArgument};
pub use schema::{Arity, EnumGroup, KeywordValue, Schema, SchemaBuilder, SchemaCell, Setter};

/// An argument struct with a statically declared schema.
pub trait CommandArguments: Default + Sized + 'static {
    fn schema() -> Result<&'static Schema<Self>, SchemaError>;

    /// Binds a full request, token 0 being the command name.
    fn parse(tokens: &[String]) -> Result<Self, ArgumentError> {
        let schema = Self::schema()?;
        schema.bind(tokens.get(1..).unwrap_or_default())
    }
}

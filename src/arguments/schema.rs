use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::arguments::argument_error::{ArgumentError, SchemaError};
use crate::arguments::coerce::CoerceError;

/// Writes one raw token into a field of the argument struct.
pub type Setter<T> = fn(&mut T, &str) -> Result<(), CoerceError>;

/// Records which alternative of an enum group was chosen.
pub type GroupRecorder<T> = fn(&mut T, &'static str);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arity {
    Required,
    Optional { default: Option<&'static str> },
    Variadic { min: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeywordValue {
    /// Presence only, no value token follows.
    Flag,
    Required,
    Optional { default: Option<&'static str> },
}

struct Position<T> {
    index: usize,
    field: &'static str,
    arity: Arity,
    setter: Setter<T>,
}

struct Group<T> {
    name: &'static str,
    record: GroupRecorder<T>,
}

impl<T> Clone for Group<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Group<T> {}

struct Keyword<T> {
    token: &'static str,
    field: &'static str,
    value: KeywordValue,
    setter: Setter<T>,
    group: Option<Group<T>>,
}

fn bind_field<T>(
    target: &mut T,
    setter: Setter<T>,
    field: &'static str,
    raw: &str,
) -> Result<(), ArgumentError> {
    setter(target, raw).map_err(|error| ArgumentError::InvalidValue {
        field,
        value: raw.to_string(),
        expected: error.expected,
    })
}

fn ignore_value<T>(_: &mut T, _: &str) -> Result<(), CoerceError> {
    Ok(())
}

/// A set of mutually exclusive keywords that share one field recording the chosen token,
/// e.g. the `EX`, `PX` and `KEEPTTL` alternatives of SET.
pub struct EnumGroup<T> {
    name: &'static str,
    record: GroupRecorder<T>,
    members: Vec<Keyword<T>>,
}

impl<T> EnumGroup<T> {
    pub fn new(name: &'static str, record: GroupRecorder<T>) -> Self {
        Self {
            name,
            record,
            members: Vec::new(),
        }
    }

    /// A member that takes no value, only its token is recorded.
    pub fn flag(mut self, token: &'static str) -> Self {
        self.members.push(Keyword {
            token,
            field: self.name,
            value: KeywordValue::Flag,
            setter: ignore_value::<T>,
            group: None,
        });
        self
    }

    /// A member followed by a required value token.
    pub fn value(mut self, token: &'static str, field: &'static str, setter: Setter<T>) -> Self {
        self.members.push(Keyword {
            token,
            field,
            value: KeywordValue::Required,
            setter,
            group: None,
        });
        self
    }
}

pub struct SchemaBuilder<T> {
    positions: Vec<Position<T>>,
    keywords: Vec<Keyword<T>>,
}

impl<T> SchemaBuilder<T> {
    pub fn required(self, index: usize, field: &'static str, setter: Setter<T>) -> Self {
        self.position(index, field, Arity::Required, setter)
    }

    pub fn optional(
        self,
        index: usize,
        field: &'static str,
        default: Option<&'static str>,
        setter: Setter<T>,
    ) -> Self {
        self.position(index, field, Arity::Optional { default }, setter)
    }

    /// A slot that greedily takes every token not needed by the required positions after it.
    pub fn variadic(self, index: usize, field: &'static str, min: usize, setter: Setter<T>) -> Self {
        self.position(index, field, Arity::Variadic { min }, setter)
    }

    fn position(mut self, index: usize, field: &'static str, arity: Arity, setter: Setter<T>) -> Self {
        self.positions.push(Position {
            index,
            field,
            arity,
            setter,
        });
        self
    }

    pub fn flag(self, token: &'static str, field: &'static str, setter: Setter<T>) -> Self {
        self.keyword(token, field, KeywordValue::Flag, setter)
    }

    pub fn option(self, token: &'static str, field: &'static str, setter: Setter<T>) -> Self {
        self.keyword(token, field, KeywordValue::Required, setter)
    }

    pub fn optional_option(
        self,
        token: &'static str,
        field: &'static str,
        default: Option<&'static str>,
        setter: Setter<T>,
    ) -> Self {
        self.keyword(token, field, KeywordValue::Optional { default }, setter)
    }

    fn keyword(
        mut self,
        token: &'static str,
        field: &'static str,
        value: KeywordValue,
        setter: Setter<T>,
    ) -> Self {
        self.keywords.push(Keyword {
            token,
            field,
            value,
            setter,
            group: None,
        });
        self
    }

    pub fn enum_group(mut self, group: EnumGroup<T>) -> Self {
        let shared = Group {
            name: group.name,
            record: group.record,
        };

        for mut member in group.members {
            member.group = Some(shared);
            self.keywords.push(member);
        }
        self
    }

    /// Validates the declared layout and produces an immutable schema.
    ///
    /// Positions must be numbered `1..=N`. Required positions come first and are followed
    /// either by optional positions or by a single variadic slot, which may itself be
    /// followed by more required positions.
    pub fn build(self) -> Result<Schema<T>, SchemaError> {
        let mut positions = self.positions;
        positions.sort_by_key(|position| position.index);

        for pair in positions.windows(2) {
            if pair[0].index == pair[1].index {
                return Err(SchemaError::DuplicatePosition(pair[0].index));
            }
        }

        for (expected, position) in (1..).zip(&positions) {
            if position.index != expected {
                return Err(SchemaError::NonContiguousPositions {
                    count: positions.len(),
                    found: position.index,
                });
            }
        }

        let mut phase = Phase::Leading;
        let mut minimum = 0;
        let mut trailing_required = 0;

        for position in &positions {
            phase = match (phase, position.arity) {
                (Phase::Leading, Arity::Required) => Phase::Leading,
                (Phase::Leading, Arity::Optional { .. }) => Phase::Optional,
                (Phase::Leading, Arity::Variadic { .. }) => Phase::Trailing,
                (Phase::Optional, Arity::Optional { .. }) => Phase::Optional,
                (Phase::Trailing, Arity::Required) => {
                    trailing_required += 1;
                    Phase::Trailing
                }
                (Phase::Trailing, Arity::Variadic { .. }) => {
                    return Err(SchemaError::MultipleVariadic)
                }
                _ => return Err(SchemaError::InvalidPositionOrder(position.field)),
            };

            minimum += match position.arity {
                Arity::Required => 1,
                Arity::Optional { .. } => 0,
                Arity::Variadic { min } => min,
            };
        }

        let mut keywords = HashMap::with_capacity(self.keywords.len());

        for keyword in self.keywords {
            if keyword.token != keyword.token.to_ascii_uppercase() {
                return Err(SchemaError::LowercaseKeyword(keyword.token));
            }
            if keywords.contains_key(keyword.token) {
                return Err(SchemaError::DuplicateKeyword(keyword.token));
            }
            keywords.insert(keyword.token, keyword);
        }

        Ok(Schema {
            positions,
            keywords,
            minimum,
            trailing_required,
        })
    }
}

#[derive(Clone, Copy)]
enum Phase {
    Leading,
    Optional,
    Trailing,
}

/// Compiled binding metadata for one argument struct.
pub struct Schema<T> {
    positions: Vec<Position<T>>,
    keywords: HashMap<&'static str, Keyword<T>>,
    minimum: usize,
    trailing_required: usize,
}

impl<T> Schema<T> {
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder {
            positions: Vec::new(),
            keywords: Vec::new(),
        }
    }

    /// Binds `arguments` (the command name already stripped) onto a fresh `T`.
    ///
    /// Positions are filled first, left to right. Every token left over is read as a keyword,
    /// matched case-insensitively against the keyword table.
    pub fn bind(&self, arguments: &[String]) -> Result<T, ArgumentError>
    where
        T: Default,
    {
        if arguments.len() < self.minimum {
            return Err(ArgumentError::NotEnoughArguments {
                required: self.minimum,
                provided: arguments.len(),
            });
        }

        let mut target = T::default();
        let mut cursor = 0;

        for position in &self.positions {
            match position.arity {
                Arity::Required => {
                    let raw = arguments.get(cursor).ok_or(ArgumentError::NotEnoughArguments {
                        required: self.minimum,
                        provided: arguments.len(),
                    })?;
                    bind_field(&mut target, position.setter, position.field, raw)?;
                    cursor += 1;
                }
                Arity::Optional { default } => match arguments.get(cursor) {
                    Some(raw) => {
                        bind_field(&mut target, position.setter, position.field, raw)?;
                        cursor += 1;
                    }
                    None => {
                        if let Some(default) = default {
                            bind_field(&mut target, position.setter, position.field, default)?;
                        }
                    }
                },
                Arity::Variadic { .. } => {
                    let end = arguments
                        .len()
                        .saturating_sub(self.trailing_required)
                        .max(cursor);

                    for raw in &arguments[cursor..end] {
                        bind_field(&mut target, position.setter, position.field, raw)?;
                    }
                    cursor = end;
                }
            }
        }

        self.bind_keywords(&mut target, arguments, cursor)?;

        Ok(target)
    }

    fn bind_keywords(
        &self,
        target: &mut T,
        arguments: &[String],
        mut cursor: usize,
    ) -> Result<(), ArgumentError> {
        let mut seen: HashSet<&'static str> = HashSet::new();
        let mut chosen: HashMap<&'static str, &'static str> = HashMap::new();

        while let Some(raw) = arguments.get(cursor) {
            let index = cursor + 1;
            cursor += 1;

            let Some(keyword) = self.keywords.get(raw.to_ascii_uppercase().as_str()) else {
                return Err(ArgumentError::UnknownKeyword {
                    token: raw.clone(),
                    index,
                });
            };

            if !seen.insert(keyword.token) {
                return Err(ArgumentError::DuplicateKeyword {
                    token: raw.clone(),
                    index,
                });
            }

            if let Some(group) = keyword.group {
                if let Some(first) = chosen.insert(group.name, keyword.token) {
                    return Err(ArgumentError::ConflictingKeywords {
                        group: group.name,
                        first,
                        second: keyword.token,
                    });
                }
                (group.record)(target, keyword.token);
            }

            match keyword.value {
                KeywordValue::Flag => bind_field(target, keyword.setter, keyword.field, "")?,
                KeywordValue::Required => {
                    let value = arguments.get(cursor).ok_or(ArgumentError::MissingValue {
                        keyword: keyword.token,
                    })?;
                    bind_field(target, keyword.setter, keyword.field, value)?;
                    cursor += 1;
                }
                KeywordValue::Optional { default } => match arguments.get(cursor) {
                    Some(value) => {
                        bind_field(target, keyword.setter, keyword.field, value)?;
                        cursor += 1;
                    }
                    None => {
                        if let Some(default) = default {
                            bind_field(target, keyword.setter, keyword.field, default)?;
                        }
                    }
                },
            }
        }

        Ok(())
    }
}

/// Process-wide cache holding the compiled schema of one argument struct.
///
/// Declared as a `static` inside each [`CommandArguments`](crate::arguments::CommandArguments)
/// implementation so the schema is built on first use and shared afterwards.
pub struct SchemaCell<T> {
    cell: OnceLock<Result<Schema<T>, SchemaError>>,
}

impl<T> SchemaCell<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Returns the cached schema, declaring it through `declare` on first use.
    pub fn get_or_build(
        &'static self,
        declare: impl FnOnce(SchemaBuilder<T>) -> SchemaBuilder<T>,
    ) -> Result<&'static Schema<T>, SchemaError> {
        self.cell
            .get_or_init(|| declare(Schema::builder()).build())
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl<T> Default for SchemaCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

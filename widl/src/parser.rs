//! Text → [`Fragment`] reader for a compact subset of the Web IDL
//! declaration grammar: interfaces (plain and callback) with attributes and
//! operations, dictionaries, enumerations, callback functions and typedefs.
//! Extended attributes, partial declarations and namespaces are not part of
//! the subset.

use crate::decl::{
    Argument, Attribute, CallbackFunction, DefaultValue, Dictionary, DictionaryMember,
    Enumeration, Fragment, Interface, Operation, Typedef,
};
use crate::error::IdlError;
use crate::syntax::{parse_type, Token, TokenStream};

impl Fragment {
    pub fn parse(source: &str) -> Result<Self, IdlError> {
        let mut stream = TokenStream::new(source)?;
        let mut fragment = Fragment::default();
        while !stream.at_end() {
            if stream.eat_keyword("interface") {
                fragment
                    .interfaces
                    .push(Interface::parse(&mut stream, false)?);
            } else if stream.eat_keyword("callback") {
                if stream.eat_keyword("interface") {
                    fragment
                        .interfaces
                        .push(Interface::parse(&mut stream, true)?);
                } else {
                    fragment
                        .callback_functions
                        .push(CallbackFunction::parse(&mut stream)?);
                }
            } else if stream.eat_keyword("dictionary") {
                fragment.dictionaries.push(Dictionary::parse(&mut stream)?);
            } else if stream.eat_keyword("enum") {
                fragment
                    .enumerations
                    .push(Enumeration::parse(&mut stream)?);
            } else if stream.eat_keyword("typedef") {
                fragment.typedefs.push(Typedef::parse(&mut stream)?);
            } else {
                // at_end was false, so there is a token here.
                let found = stream.advance().unwrap();
                return Err(IdlError::UnexpectedToken {
                    expected:
                        "a definition (`interface`, `callback`, `dictionary`, `enum` or `typedef`)",
                    found: found.to_string(),
                });
            }
        }
        Ok(fragment)
    }
}

/// Parses the optional `: Parent` inheritance clause.
fn parse_inheritance(stream: &mut TokenStream) -> Result<Option<String>, IdlError> {
    if stream.eat(&Token::Colon) {
        Ok(Some(stream.expect_identifier("a parent name")?))
    } else {
        Ok(None)
    }
}

fn parse_default(stream: &mut TokenStream) -> Result<DefaultValue, IdlError> {
    match stream.advance() {
        Some(Token::Integer(value)) => Ok(DefaultValue::Integer(value)),
        Some(Token::Float(value)) => Ok(DefaultValue::Number(value)),
        Some(Token::StringLit(value)) => Ok(DefaultValue::String(value)),
        Some(Token::Identifier(word)) if word == "true" => Ok(DefaultValue::Boolean(true)),
        Some(Token::Identifier(word)) if word == "false" => Ok(DefaultValue::Boolean(false)),
        Some(Token::Identifier(word)) if word == "null" => Ok(DefaultValue::Null),
        Some(Token::LeftBracket) => {
            stream.expect(&Token::RightBracket, "`]` closing an empty sequence default")?;
            Ok(DefaultValue::EmptySequence)
        }
        Some(found) => Err(IdlError::UnexpectedToken {
            expected: "a default value",
            found: found.to_string(),
        }),
        None => Err(IdlError::UnexpectedEnd {
            context: "a default value",
        }),
    }
}

/// Parses an argument list up to and including the closing `)`. The opening
/// `(` has already been consumed.
fn parse_arguments(stream: &mut TokenStream) -> Result<Vec<Argument>, IdlError> {
    let mut arguments = Vec::new();
    if stream.eat(&Token::RightParen) {
        return Ok(arguments);
    }
    loop {
        let optional = stream.eat_keyword("optional");
        let ty = parse_type(stream)?;
        let name = stream.expect_identifier("an argument name")?;
        let default = if stream.eat(&Token::Equals) {
            Some(parse_default(stream)?)
        } else {
            None
        };
        arguments.push(Argument {
            name,
            ty,
            optional,
            default,
        });
        if stream.eat(&Token::Comma) {
            continue;
        }
        stream.expect(&Token::RightParen, "`)` closing an argument list")?;
        return Ok(arguments);
    }
}

impl Interface {
    fn parse(stream: &mut TokenStream, is_callback: bool) -> Result<Self, IdlError> {
        let name = stream.expect_identifier("an interface name")?;
        let parent = parse_inheritance(stream)?;
        stream.expect(&Token::LeftBrace, "`{` opening an interface body")?;

        let mut attributes = Vec::new();
        let mut operations = Vec::new();
        loop {
            if stream.eat(&Token::RightBrace) {
                break;
            }
            let readonly = stream.eat_keyword("readonly");
            if stream.eat_keyword("attribute") {
                let ty = parse_type(stream)?;
                let name = stream.expect_identifier("an attribute name")?;
                stream.expect(&Token::Semicolon, "`;` after an attribute")?;
                attributes.push(Attribute { name, ty, readonly });
            } else if readonly {
                let found = stream
                    .advance()
                    .map_or_else(|| "end of input".to_string(), |t| t.to_string());
                return Err(IdlError::UnexpectedToken {
                    expected: "`attribute` after `readonly`",
                    found,
                });
            } else {
                let return_type = parse_type(stream)?;
                let name = stream.expect_identifier("an operation name")?;
                stream.expect(&Token::LeftParen, "`(` opening an argument list")?;
                let arguments = parse_arguments(stream)?;
                stream.expect(&Token::Semicolon, "`;` after an operation")?;
                operations.push(Operation {
                    name,
                    return_type,
                    arguments,
                });
            }
        }
        stream.expect(&Token::Semicolon, "`;` after an interface")?;

        Ok(Self {
            name,
            parent,
            is_callback,
            attributes,
            operations,
        })
    }
}

impl Dictionary {
    fn parse(stream: &mut TokenStream) -> Result<Self, IdlError> {
        let name = stream.expect_identifier("a dictionary name")?;
        let parent = parse_inheritance(stream)?;
        stream.expect(&Token::LeftBrace, "`{` opening a dictionary body")?;

        let mut members = Vec::new();
        loop {
            if stream.eat(&Token::RightBrace) {
                break;
            }
            let required = stream.eat_keyword("required");
            let ty = parse_type(stream)?;
            let name = stream.expect_identifier("a dictionary member name")?;
            let default = if stream.eat(&Token::Equals) {
                Some(parse_default(stream)?)
            } else {
                None
            };
            stream.expect(&Token::Semicolon, "`;` after a dictionary member")?;
            members.push(DictionaryMember {
                name,
                ty,
                required,
                default,
            });
        }
        stream.expect(&Token::Semicolon, "`;` after a dictionary")?;

        Ok(Self {
            name,
            parent,
            members,
        })
    }
}

impl Enumeration {
    fn parse(stream: &mut TokenStream) -> Result<Self, IdlError> {
        let name = stream.expect_identifier("an enum name")?;
        stream.expect(&Token::LeftBrace, "`{` opening an enum body")?;

        let mut values = Vec::new();
        loop {
            if stream.eat(&Token::RightBrace) {
                break;
            }
            match stream.advance() {
                Some(Token::StringLit(value)) => values.push(value),
                Some(found) => {
                    return Err(IdlError::UnexpectedToken {
                        expected: "a string enum value",
                        found: found.to_string(),
                    })
                }
                None => {
                    return Err(IdlError::UnexpectedEnd {
                        context: "an enum body",
                    })
                }
            }
            if !stream.eat(&Token::Comma) {
                stream.expect(&Token::RightBrace, "`}` closing an enum body")?;
                break;
            }
        }
        stream.expect(&Token::Semicolon, "`;` after an enum")?;

        Ok(Self { name, values })
    }
}

impl CallbackFunction {
    fn parse(stream: &mut TokenStream) -> Result<Self, IdlError> {
        let name = stream.expect_identifier("a callback name")?;
        stream.expect(&Token::Equals, "`=` after a callback name")?;
        let return_type = parse_type(stream)?;
        stream.expect(&Token::LeftParen, "`(` opening an argument list")?;
        let arguments = parse_arguments(stream)?;
        stream.expect(&Token::Semicolon, "`;` after a callback")?;

        Ok(Self {
            name,
            return_type,
            arguments,
        })
    }
}

impl Typedef {
    fn parse(stream: &mut TokenStream) -> Result<Self, IdlError> {
        let ty = parse_type(stream)?;
        let name = stream.expect_identifier("a typedef name")?;
        stream.expect(&Token::Semicolon, "`;` after a typedef")?;

        Ok(Self { name, ty })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl_type::IdlType;

    #[test]
    fn parses_every_definition_kind() {
        let fragment = Fragment::parse(
            r#"
            typedef double Distance;

            enum Mode { "open", "closed", };

            callback Comparator = short (long a, long b);

            callback interface Observer {
                void notify(DOMString message);
            };

            dictionary Options : BaseOptions {
                required long count;
                DOMString label = "untitled";
                sequence<Distance> offsets = [];
            };

            interface Widget : EventTarget {
                readonly attribute DOMString name;
                attribute Distance width;
                void resize(Distance width, optional boolean animate = false);
                sequence<Widget> children();
            };
            "#,
        )
        .unwrap();

        assert_eq!(fragment.typedefs.len(), 1);
        assert_eq!(fragment.typedefs[0].name, "Distance");
        assert_eq!(fragment.typedefs[0].ty, IdlType::basic("double"));

        assert_eq!(fragment.enumerations.len(), 1);
        assert_eq!(fragment.enumerations[0].values, ["open", "closed"]);

        assert_eq!(fragment.callback_functions.len(), 1);
        let comparator = &fragment.callback_functions[0];
        assert_eq!(comparator.name, "Comparator");
        assert_eq!(comparator.arguments.len(), 2);

        assert_eq!(fragment.interfaces.len(), 2);
        let observer = &fragment.interfaces[0];
        assert!(observer.is_callback);
        assert_eq!(observer.operations.len(), 1);

        let widget = &fragment.interfaces[1];
        assert!(!widget.is_callback);
        assert_eq!(widget.parent.as_deref(), Some("EventTarget"));
        assert_eq!(widget.attributes.len(), 2);
        assert!(widget.attributes[0].readonly);
        assert_eq!(widget.operations.len(), 2);
        let resize = &widget.operations[0];
        assert!(resize.arguments[1].optional);
        assert!(matches!(
            resize.arguments[1].default,
            Some(DefaultValue::Boolean(false))
        ));

        assert_eq!(fragment.dictionaries.len(), 1);
        let options = &fragment.dictionaries[0];
        assert_eq!(options.parent.as_deref(), Some("BaseOptions"));
        assert!(options.members[0].required);
        assert!(matches!(
            options.members[1].default,
            Some(DefaultValue::String(ref s)) if s == "untitled"
        ));
        assert!(matches!(
            options.members[2].default,
            Some(DefaultValue::EmptySequence)
        ));
    }

    #[test]
    fn rejects_unknown_definitions() {
        assert!(matches!(
            Fragment::parse("module Foo {};"),
            Err(IdlError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn rejects_readonly_without_attribute() {
        let source = "interface I { readonly void f(); };";
        assert!(matches!(
            Fragment::parse(source),
            Err(IdlError::UnexpectedToken { .. })
        ));
    }
}

//! Parses the column list given to [TableQuery::select](crate::store::TableQuery::select).
//!
//! The grammar is a small subset of the one used by PostgREST style query
//! clients:
//!
//! ```text
//! select  := item ("," item)*
//! item    := "*" | column | [alias ":"] table "(" columns ")"
//! columns := "*" | column ("," column)*
//! ```
//!
//! An item with parentheses embeds the row referenced through a foreign key,
//! e.g. `*, account:accounts(name)`.

use crate::store::StoreError;

/// A single entry in a select list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SelectItem {
    /// Every column of the queried table.
    All,
    /// A single column of the queried table.
    Column(String),
    /// The row of `table` referenced by a foreign key, rendered under `alias`.
    Embed {
        alias: String,
        table: String,
        columns: EmbedColumns,
    },
}

/// The columns to include in an embedded row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EmbedColumns {
    All,
    Named(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    Star,
    Comma,
    Colon,
    OpenParen,
    CloseParen,
}

/// Parse `input` into the items it selects.
///
/// # Errors
/// Returns [StoreError::InvalidSelect] if `input` is empty or does not follow
/// the grammar in the module docs.
pub(crate) fn parse_select(input: &str) -> Result<Vec<SelectItem>, StoreError> {
    let invalid = |reason: &str| StoreError::InvalidSelect(input.to_owned(), reason.to_owned());

    let tokens = tokenize(input).map_err(|reason| invalid(&reason))?;

    if tokens.is_empty() {
        return Err(invalid("expected at least one column"));
    }

    let mut parser = Parser { tokens, position: 0 };
    let mut items = Vec::new();

    loop {
        items.push(parser.item().map_err(|reason| invalid(&reason))?);

        match parser.next() {
            None => break,
            Some(Token::Comma) => continue,
            Some(token) => return Err(invalid(&format!("unexpected {token:?} after column"))),
        }
    }

    Ok(items)
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '*' | ',' | ':' | '(' | ')' => {
                chars.next();
                tokens.push(match c {
                    '*' => Token::Star,
                    ',' => Token::Comma,
                    ':' => Token::Colon,
                    '(' => Token::OpenParen,
                    _ => Token::CloseParen,
                });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut identifier = String::new();

                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        identifier.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }

                tokens.push(Token::Identifier(identifier));
            }
            c => return Err(format!("unexpected character '{c}'")),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn identifier(&mut self) -> Result<String, String> {
        match self.next() {
            Some(Token::Identifier(identifier)) => Ok(identifier),
            Some(token) => Err(format!("expected a name, got {token:?}")),
            None => Err("expected a name, got the end of the input".to_owned()),
        }
    }

    fn expect(&mut self, want: Token) -> Result<(), String> {
        match self.next() {
            Some(token) if token == want => Ok(()),
            Some(token) => Err(format!("expected {want:?}, got {token:?}")),
            None => Err(format!("expected {want:?}, got the end of the input")),
        }
    }

    fn item(&mut self) -> Result<SelectItem, String> {
        if self.peek() == Some(&Token::Star) {
            self.next();
            return Ok(SelectItem::All);
        }

        let name = self.identifier()?;

        match self.peek() {
            Some(Token::Colon) => {
                self.next();
                let table = self.identifier()?;
                let columns = self.embedded_columns()?;

                Ok(SelectItem::Embed {
                    alias: name,
                    table,
                    columns,
                })
            }
            Some(Token::OpenParen) => {
                let columns = self.embedded_columns()?;

                Ok(SelectItem::Embed {
                    alias: name.clone(),
                    table: name,
                    columns,
                })
            }
            _ => Ok(SelectItem::Column(name)),
        }
    }

    fn embedded_columns(&mut self) -> Result<EmbedColumns, String> {
        self.expect(Token::OpenParen)?;

        if self.peek() == Some(&Token::Star) {
            self.next();
            self.expect(Token::CloseParen)?;
            return Ok(EmbedColumns::All);
        }

        let mut columns = vec![self.identifier()?];

        loop {
            match self.next() {
                Some(Token::Comma) => columns.push(self.identifier()?),
                Some(Token::CloseParen) => break,
                Some(Token::OpenParen) => {
                    return Err("nested embedding is not supported".to_owned());
                }
                Some(token) => return Err(format!("unexpected {token:?} in embedded columns")),
                None => return Err("unclosed parenthesis".to_owned()),
            }
        }

        Ok(EmbedColumns::Named(columns))
    }
}

#[cfg(test)]
mod tests {
    use crate::store::StoreError;

    use super::{EmbedColumns, SelectItem, parse_select};

    #[test]
    fn parses_star() {
        assert_eq!(parse_select("*").unwrap(), vec![SelectItem::All]);
    }

    #[test]
    fn parses_column_list() {
        let got = parse_select("id, name").unwrap();

        assert_eq!(
            got,
            vec![
                SelectItem::Column("id".to_owned()),
                SelectItem::Column("name".to_owned())
            ]
        );
    }

    #[test]
    fn parses_aliased_embed_across_lines() {
        let got = parse_select(
            "
          *,
          account:accounts(name)
        ",
        )
        .unwrap();

        assert_eq!(
            got,
            vec![
                SelectItem::All,
                SelectItem::Embed {
                    alias: "account".to_owned(),
                    table: "accounts".to_owned(),
                    columns: EmbedColumns::Named(vec!["name".to_owned()]),
                }
            ]
        );
    }

    #[test]
    fn embed_without_alias_uses_table_name() {
        let got = parse_select("id, accounts(*)").unwrap();

        assert_eq!(
            got[1],
            SelectItem::Embed {
                alias: "accounts".to_owned(),
                table: "accounts".to_owned(),
                columns: EmbedColumns::All,
            }
        );
    }

    #[test]
    fn rejects_malformed_input() {
        for input in [
            "",
            "   ",
            "id,",
            "id name",
            "account:accounts(name",
            "account:(name)",
            "accounts(id, owner(name))",
            "1id",
            "id; DROP TABLE accounts",
        ] {
            let got = parse_select(input);

            assert!(
                matches!(got, Err(StoreError::InvalidSelect(_, _))),
                "want InvalidSelect for {input:?}, got {got:?}"
            );
        }
    }
}

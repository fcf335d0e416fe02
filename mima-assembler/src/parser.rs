//! Assembly parser
//!
//! Turns source text into a flat list of [`Form`]s: label definitions and
//! instructions whose operands are still raw numbers or label names.

use crate::error::{AssemblerError, Result};
use crate::lexer::{position, tokenize, Spanned, Token};
use mima_spec::{Opcode, OperandKind};

/// Operand as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOperand {
    None,
    Number(i64),
    Label(String),
}

/// 1-based source position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// One syntactic form of the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Form {
    /// `name:`
    Label { name: String, at: Position },
    Instruction {
        opcode: Opcode,
        operand: RawOperand,
        at: Position,
    },
}

/// Check the label identifier rule: one or more ASCII letters
pub fn is_label_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic())
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    next: usize,
}

impl<'a> Parser<'a> {
    fn at(&self, offset: usize) -> Position {
        let (line, column) = position(self.source, offset);
        Position { line, column }
    }

    fn syntax_error(&self, offset: usize, message: impl Into<String>) -> AssemblerError {
        let at = self.at(offset);
        AssemblerError::SyntaxError {
            line: at.line,
            column: at.column,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.next)
    }

    fn peek_second(&self) -> Option<&Spanned> {
        self.tokens.get(self.next + 1)
    }

    fn bump(&mut self) -> Option<Spanned> {
        let token = self.tokens.get(self.next).cloned();
        if token.is_some() {
            self.next += 1;
        }
        token
    }

    fn forms(mut self) -> Result<Vec<Form>> {
        let mut forms = Vec::new();
        while let Some(spanned) = self.bump() {
            let start = spanned.span.start;
            let name = match spanned.token {
                Token::Identifier(name) => name,
                Token::Number(n) => {
                    return Err(self.syntax_error(start, format!("unexpected number {}", n)))
                }
                Token::Colon => return Err(self.syntax_error(start, "unexpected ':'")),
            };

            if matches!(self.peek(), Some(Spanned { token: Token::Colon, .. })) {
                self.bump();
                if !is_label_name(&name) {
                    let at = self.at(start);
                    return Err(AssemblerError::InvalidLabel {
                        label: name,
                        line: at.line,
                        column: at.column,
                    });
                }
                forms.push(Form::Label {
                    name,
                    at: self.at(start),
                });
                continue;
            }

            let opcode = match Opcode::from_mnemonic(&name) {
                Some(opcode) => opcode,
                None => {
                    let at = self.at(start);
                    return Err(AssemblerError::UnknownInstruction {
                        mnemonic: name,
                        line: at.line,
                        column: at.column,
                    });
                }
            };

            let operand = self.operand(opcode, spanned.span.end)?;
            forms.push(Form::Instruction {
                opcode,
                operand,
                at: self.at(start),
            });
        }
        Ok(forms)
    }

    /// Parse the operand `opcode` expects; `mnemonic_end` is where the mnemonic stopped
    fn operand(&mut self, opcode: Opcode, mnemonic_end: usize) -> Result<RawOperand> {
        let kind = opcode.operand_kind();
        if kind == OperandKind::None {
            return Ok(RawOperand::None);
        }

        // An identifier followed by ':' starts the next form.
        let starts_label = matches!(
            self.peek_second(),
            Some(Spanned { token: Token::Colon, .. })
        );
        let missing = || format!("{} expects an operand", opcode);

        let spanned = match self.peek() {
            Some(spanned) if !(starts_label && matches!(spanned.token, Token::Identifier(_))) => {
                spanned.clone()
            }
            _ => return Err(self.syntax_error(mnemonic_end, missing())),
        };

        if spanned.span.start == mnemonic_end {
            return Err(self.syntax_error(
                spanned.span.start,
                format!("expected whitespace after {}", opcode),
            ));
        }

        let operand = match (&spanned.token, opcode.accepts_number(), opcode.accepts_label()) {
            (Token::Number(n), true, _) => RawOperand::Number(*n),
            (Token::Identifier(name), _, true) => {
                if !is_label_name(name) {
                    let at = self.at(spanned.span.start);
                    return Err(AssemblerError::InvalidLabel {
                        label: name.clone(),
                        line: at.line,
                        column: at.column,
                    });
                }
                RawOperand::Label(name.clone())
            }
            (Token::Number(_), false, _) => {
                return Err(self.syntax_error(
                    spanned.span.start,
                    format!("{} expects a label operand", opcode),
                ))
            }
            (Token::Identifier(_), _, false) => {
                return Err(self.syntax_error(
                    spanned.span.start,
                    format!("{} expects a numeric operand", opcode),
                ))
            }
            (Token::Colon, _, _) => return Err(self.syntax_error(spanned.span.start, missing())),
        };

        self.bump();
        Ok(operand)
    }
}

/// Parse assembly source into forms
pub fn parse(source: &str) -> Result<Vec<Form>> {
    let tokens = tokenize(source).map_err(|span| {
        let (line, column) = position(source, span.start);
        AssemblerError::SyntaxError {
            line,
            column,
            message: format!("unexpected input {:?}", &source[span]),
        }
    })?;

    Parser {
        source,
        tokens,
        next: 0,
    }
    .forms()
}

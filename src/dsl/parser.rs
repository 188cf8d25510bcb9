//! Parser for the netlist language.

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{Result, SymCircuitError};
use crate::sym::{parse, Sym};

/// Parser for netlists.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<NetlistAst> {
        let mut ast = NetlistAst::new();

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    if ast.components.iter().any(|c| c.name == component.name) {
                        return Err(SymCircuitError::DuplicateComponent {
                            name: component.name,
                        });
                    }
                    for node in &component.nodes {
                        ast.add_node(node);
                    }
                    ast.components.push(component);
                }
                _ => {
                    return Err(SymCircuitError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            if self.current.kind == TokenKind::Newline {
                self.advance()?;
            }
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn expect_node(&mut self) -> Result<String> {
        match self.current.kind {
            TokenKind::Identifier | TokenKind::Number => {
                let text = self.current.text.clone();
                self.advance()?;
                Ok(if is_ground(&text) { "0".to_string() } else { text })
            }
            _ => Err(SymCircuitError::parse(
                self.current.line,
                format!("expected node name, got {:?}", self.current.kind),
            )),
        }
    }

    fn parse_directive(&mut self, ast: &mut NetlistAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".node" => {
                let node = self.expect_node()?;
                ast.add_node(&node);
            }
            ".prefix" => {
                if self.current.kind != TokenKind::Identifier {
                    return Err(SymCircuitError::parse(line, "expected node prefix"));
                }
                ast.node_prefix = Some(self.current.text.clone());
                self.advance()?;
            }
            _ => {
                return Err(SymCircuitError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        if !self.at_line_end() {
            return Err(SymCircuitError::parse(
                line,
                format!("unexpected argument to {}: {:?}", directive, self.current.text),
            ));
        }
        Ok(())
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let name = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        let component_type = name
            .chars()
            .next()
            .and_then(ComponentType::from_prefix)
            .ok_or_else(|| SymCircuitError::UnknownComponentType {
                component_type: name.clone(),
                line,
            })?;

        let mut nodes = Vec::with_capacity(2);
        for _ in 0..2 {
            if self.at_line_end() {
                return Err(SymCircuitError::invalid_component(
                    &name,
                    line,
                    format!("expected 2 nodes, got {}", nodes.len()),
                ));
            }
            nodes.push(self.expect_node()?);
        }

        let mut args = Vec::new();
        while !self.at_line_end() {
            args.push(self.current.clone());
            self.advance()?;
        }

        let mut source = SourceKeyword::Arbitrary;
        if component_type.is_source() && args.len() >= 2 && args[0].kind == TokenKind::Identifier {
            if let Some(keyword) = SourceKeyword::from_keyword(&args[0].text) {
                source = keyword;
                args.remove(0);
            }
        }

        let extra_allowed = component_type.is_reactive() || source == SourceKeyword::Ac;
        if args.len() > 1 + usize::from(extra_allowed) {
            return Err(SymCircuitError::invalid_component(
                &name,
                line,
                format!("unexpected argument {:?}", args[args.len() - 1].text),
            ));
        }

        let mut values = args.iter().map(|tok| parse_argument(tok, line));
        let value = match values.next() {
            Some(v) => v?,
            None => Sym::symbol(&name),
        };
        let extra = values.next().transpose()?;

        if source == SourceKeyword::Laplace && !value.has_symbol_named("s") {
            return Err(SymCircuitError::invalid_component(
                &name,
                line,
                "Laplace-domain value does not depend on s",
            ));
        }

        Ok(ComponentDef {
            component_type,
            name,
            nodes,
            value,
            source,
            extra,
            line,
        })
    }
}

/// A value argument: number, symbol or braced expression.
fn parse_argument(tok: &Token, line: usize) -> Result<Sym> {
    match tok.kind {
        TokenKind::Number => parse_value(&tok.text)
            .ok_or_else(|| SymCircuitError::parse(line, format!("invalid number: {}", tok.text))),
        TokenKind::Identifier | TokenKind::Expression => parse::parse(&tok.text).map_err(|e| {
            SymCircuitError::parse(line, format!("invalid value '{}': {}", tok.text, e))
        }),
        _ => Err(SymCircuitError::parse(
            line,
            format!("expected value, got {:?}", tok.text),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse as parse_netlist;

    #[test]
    fn test_parse_resistor() {
        let ast = parse_netlist("R1 in out 10k").unwrap();
        assert_eq!(ast.components.len(), 1);
        assert_eq!(ast.components[0].component_type, ComponentType::Resistor);
        assert_eq!(ast.components[0].name, "R1");
        assert_eq!(ast.components[0].nodes, vec!["in", "out"]);
        assert_eq!(ast.components[0].value, Sym::int(10_000));
        assert_eq!(ast.nodes, vec!["in", "out"]);
    }

    #[test]
    fn test_value_defaults_to_name() {
        let ast = parse_netlist("C1 2 gnd").unwrap();
        assert_eq!(ast.components[0].value, Sym::symbol("C1"));
        assert_eq!(ast.components[0].nodes, vec!["2", "0"]);
        assert_eq!(ast.nodes, vec!["2"]);
    }

    #[test]
    fn test_parse_sources() {
        let input = "V1 1 0 dc 4\nV2 2 0 ac 3 {pi / 2}\nI1 3 0 step Is\nV3 4 0 s {1 / (s + 1)}";
        let ast = parse_netlist(input).unwrap();
        let kinds: Vec<SourceKeyword> = ast.components.iter().map(|c| c.source).collect();
        assert_eq!(
            kinds,
            vec![
                SourceKeyword::Dc,
                SourceKeyword::Ac,
                SourceKeyword::Step,
                SourceKeyword::Laplace
            ]
        );
        assert_eq!(ast.components[0].value, Sym::int(4));
        assert!(ast.components[1].extra.is_some());
        assert_eq!(ast.components[2].value, Sym::symbol("Is"));
    }

    #[test]
    fn test_initial_value() {
        let ast = parse_netlist("C1 1 0 100n 5").unwrap();
        assert_eq!(ast.components[0].extra, Some(Sym::int(5)));
        assert!(parse_netlist("R1 1 0 5 6").is_err());
    }

    #[test]
    fn test_directives() {
        let ast = parse_netlist(".prefix n\n.node 7\nR1 1 0").unwrap();
        assert_eq!(ast.node_prefix.as_deref(), Some("n"));
        assert_eq!(ast.nodes, vec!["7", "1"]);
        assert!(parse_netlist(".model D1").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_netlist("X1 1 0 5"),
            Err(SymCircuitError::UnknownComponentType { .. })
        ));
        assert!(matches!(
            parse_netlist("R1 1"),
            Err(SymCircuitError::InvalidComponent { .. })
        ));
        assert!(matches!(
            parse_netlist("R1 1 0\nR1 2 0"),
            Err(SymCircuitError::DuplicateComponent { .. })
        ));
        assert!(parse_netlist("V1 1 0 s 5").is_err());
    }

    #[test]
    fn test_parse_with_comments() {
        let input = "# divider\nR1 in out 1k ; top leg\n";
        let ast = parse_netlist(input).unwrap();
        assert_eq!(ast.components.len(), 1);
    }
}

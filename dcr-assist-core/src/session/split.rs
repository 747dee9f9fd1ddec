/// Splits a SQL script into statements, dropping comments.
///
/// Semicolons inside single-quoted strings, double-quoted identifiers and
/// `$$` bodies do not end a statement. `--`, `//` and `/* */` comments are
/// removed. Terminating semicolons are not included in the output.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' | '"' => {
                current.push(ch);
                while let Some(inner) = chars.next() {
                    current.push(inner);
                    if inner == '\\' && ch == '\'' {
                        if let Some(escaped) = chars.next() {
                            current.push(escaped);
                        }
                    } else if inner == ch {
                        if chars.peek() == Some(&ch) {
                            current.push(ch);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                }
            }
            '$' if chars.peek() == Some(&'$') => {
                chars.next();
                current.push_str("$$");
                while let Some(inner) = chars.next() {
                    current.push(inner);
                    if inner == '$' && chars.peek() == Some(&'$') {
                        chars.next();
                        current.push('$');
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => skip_line(&mut chars, &mut current),
            '/' if chars.peek() == Some(&'/') => skip_line(&mut chars, &mut current),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for inner in chars.by_ref() {
                    if previous == '*' && inner == '/' {
                        break;
                    }
                    previous = inner;
                }
                current.push(' ');
            }
            ';' => finish(&mut statements, &mut current),
            _ => current.push(ch),
        }
    }

    finish(&mut statements, &mut current);
    statements
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, current: &mut String) {
    for inner in chars.by_ref() {
        if inner == '\n' || inner == '\r' {
            current.push(inner);
            break;
        }
    }
}

fn finish(statements: &mut Vec<String>, current: &mut String) {
    let statement = current.trim();
    if !statement.is_empty() {
        statements.push(statement.to_string());
    }
    current.clear();
}

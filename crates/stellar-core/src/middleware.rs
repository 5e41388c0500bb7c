//! Middleware virtual module identifiers and export inspection.

/// Logical module id a renderer imports to obtain the project's request handler.
pub const MIDDLEWARE_MODULE_ID: &str = "@stellar-middleware";

/// Sentinel id for the synthesized module used when the project has no middleware.
///
/// The leading NUL keeps other resolvers and the filesystem from claiming it.
pub const EMPTY_MIDDLEWARE: &str = "\0empty-middleware";

/// File stem looked up inside the project source directory.
pub const MIDDLEWARE_PATH_SEGMENT_NAME: &str = "middleware";

/// Name of the request handler binding a middleware module exports.
pub const MIDDLEWARE_HANDLER_EXPORT: &str = "onRequest";

/// Source text of the synthesized empty middleware module.
pub const EMPTY_MIDDLEWARE_SOURCE: &str = "export const onRequest = undefined";

/// State of the `onRequest` binding in a middleware module's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerExport {
    /// The binding exists and holds a handler.
    Present,
    /// The binding exists but is explicitly `undefined`.
    Absent,
    /// The module does not export the binding at all.
    Missing,
}

impl HandlerExport {
    /// Inspect module source for the request handler export.
    ///
    /// Recognises top-level `export [async] function onRequest`,
    /// `export const|let|var onRequest[: Type] = ...` and specifier lists
    /// such as `export { handler as onRequest }`.
    pub fn of_source(source: &str) -> Self {
        let mut line_start = 0;
        for line in source.split_inclusive('\n') {
            let indent = line.len() - line.trim_start().len();
            let from = &source[line_start + indent..];
            line_start += line.len();

            let Some(rest) = from.strip_prefix("export") else {
                continue;
            };
            if !rest.starts_with(|c: char| c.is_whitespace() || c == '{') {
                continue;
            }
            let rest = rest.trim_start();

            if let Some(list) = rest.strip_prefix('{') {
                if list_exports_handler(list) {
                    return Self::Present;
                }
                continue;
            }

            let fn_decl = rest
                .strip_prefix("async ")
                .map(str::trim_start)
                .unwrap_or(rest)
                .strip_prefix("function ");
            if let Some(decl) = fn_decl {
                if binding_name(decl.trim_start()) == MIDDLEWARE_HANDLER_EXPORT {
                    return Self::Present;
                }
                continue;
            }

            let binding = ["const ", "let ", "var "]
                .iter()
                .find_map(|kw| rest.strip_prefix(kw));
            let Some(binding) = binding else {
                continue;
            };
            let binding = binding.trim_start();
            if binding_name(binding) != MIDDLEWARE_HANDLER_EXPORT {
                continue;
            }

            let value = initializer(&binding[MIDDLEWARE_HANDLER_EXPORT.len()..]).map(|init| {
                let init = init.trim_start();
                init.split([';', '\n']).next().unwrap_or_default().trim()
            });

            return match value {
                Some("undefined") | Some("void 0") | Some("") | None => Self::Absent,
                Some(_) => Self::Present,
            };
        }

        Self::Missing
    }

    /// Whether downstream code has a handler to call.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }
}

fn binding_name(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(s.len());
    &s[..end]
}

/// Text after the assignment of a declaration, skipping any type annotation.
///
/// `None` when the declaration ends without an initializer.
fn initializer(decl: &str) -> Option<&str> {
    let bytes = decl.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'<' | b'[' | b'{' => depth += 1,
            b')' | b'>' | b']' | b'}' => depth = depth.saturating_sub(1),
            // Arrow in a function type.
            b'=' if bytes.get(i + 1) == Some(&b'>') => i += 1,
            b'=' if depth == 0 => return Some(&decl[i + 1..]),
            b';' | b'\n' if depth == 0 => return None,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Whether a `{ a, b as c }` specifier list exports the handler name.
fn list_exports_handler(list: &str) -> bool {
    let body = list.split('}').next().unwrap_or_default();
    body.split(',')
        .map(str::trim)
        .filter(|specifier| !specifier.starts_with("type "))
        .any(|specifier| {
            let exported = specifier
                .rsplit_once(" as ")
                .map_or(specifier, |(_, alias)| alias)
                .trim();
            exported == MIDDLEWARE_HANDLER_EXPORT
        })
}

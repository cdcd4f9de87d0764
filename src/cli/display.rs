use crate::pipeline::CompileOutput;
use std::fmt::Write;

/// Render the analysis dumps requested on the command line
pub fn format_reports(output: &CompileOutput, liveness: bool, var_tables: bool) -> String {
    let mut out = String::new();
    if !liveness && !var_tables {
        return out;
    }

    for method in &output.methods {
        let _ = writeln!(out, "method {}.{}", output.class_name, method.name);
        if liveness {
            let _ = writeln!(
                out,
                "  liveness ({} pass(es)):",
                method.liveness_passes
            );
            out.push_str(&method.liveness);
        }
        if var_tables {
            match method.extra_registers {
                Some(extra) => {
                    let _ = writeln!(out, "  variables ({} extra register(s)):", extra);
                }
                None => {
                    let _ = writeln!(out, "  variables:");
                }
            }
            out.push_str(&method.var_table);
        }
        out.push('\n');
    }
    out
}

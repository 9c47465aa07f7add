/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 *
 * Renderers from the Model AST back to script source and to JSON.
 *
 * Rendering is total: any structurally complete tree renders, valid or not.
 * Callers validate first when they need correct output.
 */

pub mod json;
pub mod script;

#[cfg(test)]
mod tests;

pub use script::ScriptWriter;

/// Nodes that render as pipeline script.
pub trait ToScript {
    /// Append this node to `writer` at its current indentation.
    fn write_script(&self, writer: &mut ScriptWriter);

    /// Render this node on its own, without a trailing newline.
    fn to_script(&self) -> String {
        let mut writer = ScriptWriter::new();
        self.write_script(&mut writer);
        writer.finish()
    }
}

/// Nodes that render as canonical JSON.
pub trait ToJson {
    fn to_json(&self) -> serde_json::Value;
}

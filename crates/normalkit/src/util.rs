#[allow(unused_macros)]
macro_rules! doc {
    ($text: expr) => {
        $crate::editing::document::SharedDocument::from($text)
    };
    ($text: expr, $( $r: expr ),+) => {{
        let doc = $crate::editing::document::SharedDocument::from($text);
        doc.set_ranges(&[ $( $r, )+ ]);
        doc
    }};
}

#[allow(unused_macros)]
macro_rules! keys {
    ($ks: expr) => {
        $crate::key::NormalKey::parse_seq($ks).expect("valid key notation")
    };
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::commands::Command;
    use crate::editing::{
        context::EditingContext,
        document::{DocumentEditor, DocumentSelection, SharedDocument},
    };
    use crate::errors::CommandResult;
    use crate::instance::Instance;

    pub type DocCommand = Command<DocumentSelection, DocumentEditor>;

    /// Apply a command to every selection in a document, as a single keystroke.
    pub fn apply(cmd: &DocCommand, doc: &SharedDocument, instance: &mut Instance) -> CommandResult {
        let mut editor = doc.editor();
        let mut selections = doc.selections();
        let mut ctx = EditingContext::new(&mut editor, instance);

        for sel in selections.iter_mut() {
            cmd.invoke(sel, &mut ctx)?;
        }

        Ok(())
    }

    /// Apply a command as a keystroke `n` separate times.
    pub fn repeat(cmd: &DocCommand, n: usize, doc: &SharedDocument) -> CommandResult {
        let mut instance = Instance::new();

        for _ in 0..n {
            apply(cmd, doc, &mut instance)?;
        }

        Ok(())
    }
}

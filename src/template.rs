//! Prompt layouts with an instruction slot and an input slot.

use crate::error::PromptError;

const INSTRUCTION_SLOT: &str = "{instruction}";
const INPUT_SLOT: &str = "{input}";

pub const INSTRUCTION_FIRST: &str =
    "\n<|im_start|>user\n{instruction} {input}\n<|im_end|>\n<|im_start|>assistant\n";
pub const INPUT_FIRST: &str =
    "\n<|im_start|>user\n{input} {instruction}\n<|im_end|>\n<|im_start|>assistant\n";
/// Single user turn with no fixed instruction.
pub const CHAT_TURN: &str = "<|im_start|>user\n{input}<|im_end|>\n<|im_start|>assistant\n";

/// Which of the two fixed layouts a prompt function uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlotOrder {
    #[default]
    InstructionFirst,
    InputFirst,
}

impl SlotOrder {
    pub fn layout(self) -> &'static str {
        match self {
            SlotOrder::InstructionFirst => INSTRUCTION_FIRST,
            SlotOrder::InputFirst => INPUT_FIRST,
        }
    }
}

/// A layout with the instruction already filled in, split around the
/// input slot so rendering is a concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    prefix: String,
    suffix: String,
}

impl Template {
    pub fn new(order: SlotOrder, instruction: &str) -> Self {
        // the built-in layouts always have one input slot
        match Self::from_layout(order.layout(), instruction) {
            Ok(t) => t,
            Err(_) => unreachable!("built-in layouts are valid"),
        }
    }

    pub fn from_layout(layout: &str, instruction: &str) -> Result<Self, PromptError> {
        let mut parts = layout.split(INPUT_SLOT);
        let (prefix, suffix) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(s), None) => (p, s),
            _ => return Err(PromptError::InvalidTemplate),
        };
        Ok(Self {
            prefix: prefix.replace(INSTRUCTION_SLOT, instruction),
            suffix: suffix.replace(INSTRUCTION_SLOT, instruction),
        })
    }

    pub fn render(&self, input: &str) -> String {
        let mut out = String::with_capacity(self.prefix.len() + input.len() + self.suffix.len());
        out.push_str(&self.prefix);
        out.push_str(input);
        out.push_str(&self.suffix);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_first_by_default() {
        let t = Template::new(SlotOrder::default(), "Name the country:");
        let p = t.render("Tokyo");
        assert_eq!(
            p,
            "\n<|im_start|>user\nName the country: Tokyo\n<|im_end|>\n<|im_start|>assistant\n"
        );
        assert!(p.find("Name the country:").unwrap() < p.find("Tokyo").unwrap());
    }

    #[test]
    fn input_first_puts_input_before_instruction() {
        let t = Template::new(SlotOrder::InputFirst, "Name the country:");
        let p = t.render("Tokyo");
        assert!(p.find("Tokyo").unwrap() < p.find("Name the country:").unwrap());
    }

    #[test]
    fn braces_in_input_are_not_substituted() {
        let t = Template::new(SlotOrder::InstructionFirst, "Echo:");
        assert!(t.render("{instruction}").contains("Echo: {instruction}"));
    }

    #[test]
    fn layout_without_input_slot_is_rejected() {
        assert!(matches!(
            Template::from_layout("{instruction} only", "x"),
            Err(PromptError::InvalidTemplate)
        ));
        assert!(Template::from_layout("{input}{input}", "x").is_err());
    }

    #[test]
    fn chat_turn_has_no_instruction() {
        let t = Template::from_layout(CHAT_TURN, "").unwrap();
        assert_eq!(
            t.render("hi"),
            "<|im_start|>user\nhi<|im_end|>\n<|im_start|>assistant\n"
        );
    }
}

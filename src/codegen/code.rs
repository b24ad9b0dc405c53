//! Instruction buffer for one routine
//!
//! Tracks the operand-stack depth while instructions are appended. After an
//! unconditional transfer the next instruction is only reachable through a
//! label, so the depth restarts from the one recorded when the label was
//! first targeted. The maximum seen becomes `.limit stack`.

use std::collections::HashMap;

use super::opcodes::Instruction;

#[derive(Debug, Default)]
pub struct Code {
    instructions: Vec<Instruction>,
    cur_stack: u16,
    max_stack: u16,
    /// Stack depth on entry to each label seen so far
    label_depths: HashMap<String, u16>,
    alive: bool,
}

impl Code {
    pub fn new() -> Self {
        Self {
            alive: true,
            ..Self::default()
        }
    }

    pub fn emit(&mut self, instruction: Instruction) {
        if let Instruction::Label(label) = &instruction {
            self.enter_label(label.clone());
            self.instructions.push(instruction);
            return;
        }

        let effect = instruction.stack_effect().unwrap_or_default();
        self.cur_stack = self.cur_stack.saturating_sub(effect.pops);
        if let Some(target) = instruction.branch_target() {
            self.label_depths.entry(target.to_string()).or_insert(self.cur_stack);
        }
        self.cur_stack = self.cur_stack.saturating_add(effect.pushes);
        self.max_stack = self.max_stack.max(self.cur_stack);
        self.alive = !instruction.ends_flow();
        self.instructions.push(instruction);
    }

    /// Shorthand for `emit(Instruction::Label(..))`
    pub fn place_label(&mut self, label: &str) {
        self.emit(Instruction::Label(label.to_string()));
    }

    fn enter_label(&mut self, label: String) {
        match self.label_depths.get(&label) {
            Some(&depth) if !self.alive => self.cur_stack = depth,
            Some(_) => {}
            None => {
                self.label_depths.insert(label, self.cur_stack);
            }
        }
        self.alive = true;
    }

    pub fn cur_stack(&self) -> u16 {
        self.cur_stack
    }

    pub fn max_stack(&self) -> u16 {
        self.max_stack
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }
}

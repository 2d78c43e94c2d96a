/*
    Current preset position on the instrument, tracked as (program, bank LSB).

    Passive tracking stores whatever the keyboard reports. Only `increment` enforces
    the PROGRAMS_PER_BANK x N_BANKS grid.
*/

pub const PROGRAMS_PER_BANK: u8 = 100;
pub const N_BANKS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgramState {
    pub program_number: u8,
    pub bank_lsb: u8,
}

#[derive(Debug, Default)]
pub struct ProgramCounter {
    state: ProgramState,
}

impl ProgramCounter {
    pub fn new() -> ProgramCounter {
        ProgramCounter::default()
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    pub fn set_program(&mut self, value: u8) {
        self.state.program_number = value;
    }

    pub fn set_bank_lsb(&mut self, value: u8) {
        self.state.bank_lsb = value;
    }

    // Bank-major, program-minor. Saturates at the last program of the last bank.
    pub fn increment(&mut self) {
        let state = &mut self.state;
        if state.program_number < PROGRAMS_PER_BANK - 1 {
            state.program_number += 1;
        } else if state.bank_lsb < N_BANKS - 1 {
            state.program_number = 0;
            state.bank_lsb += 1;
        }
    }
}

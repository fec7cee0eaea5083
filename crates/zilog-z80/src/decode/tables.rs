use std::sync::LazyLock;

use super::{CycleCost, Descriptor, Handler, Operand};
use crate::ops::{arith, bits, block, control, exchange, load, stack};

type Table = [Option<Descriptor>; 256];

pub(super) struct Tables {
    pub main: Table,
    pub cb: Table,
    pub ed: Table,
    /// Shared by DD and FD; the prefix picks IX or IY at run time.
    pub index: Table,
    /// Shared by DDCB and FDCB.
    pub index_cb: Table,
}

pub(super) static TABLES: LazyLock<Tables> = LazyLock::new(|| Tables {
    main: main_table(),
    cb: cb_table(),
    ed: ed_table(),
    index: index_table(),
    index_cb: index_cb_table(),
});

const fn fixed(t: u8) -> CycleCost {
    CycleCost::Fixed(t)
}

const fn branch(taken: u8, not_taken: u8) -> CycleCost {
    CycleCost::Conditional { taken, not_taken }
}

struct Builder {
    table: Table,
}

impl Builder {
    fn new() -> Self {
        Self { table: [None; 256] }
    }

    fn set(
        &mut self,
        opcode: u8,
        mnemonic: &'static str,
        operand: Operand,
        cost: CycleCost,
        handler: Handler,
    ) {
        self.table[usize::from(opcode)] = Some(Descriptor {
            mnemonic,
            operand,
            cost,
            handler,
        });
    }

    fn finish(self) -> Table {
        self.table
    }
}

const ALU_R: [&str; 8] = [
    "ADD A,r", "ADC A,r", "SUB r", "SBC A,r", "AND r", "XOR r", "OR r", "CP r",
];
const ALU_HL: [&str; 8] = [
    "ADD A,(HL)", "ADC A,(HL)", "SUB (HL)", "SBC A,(HL)", "AND (HL)", "XOR (HL)", "OR (HL)",
    "CP (HL)",
];
const ALU_N: [&str; 8] = [
    "ADD A,n", "ADC A,n", "SUB n", "SBC A,n", "AND n", "XOR n", "OR n", "CP n",
];
const ALU_IX: [&str; 8] = [
    "ADD A,(IX+d)",
    "ADC A,(IX+d)",
    "SUB (IX+d)",
    "SBC A,(IX+d)",
    "AND (IX+d)",
    "XOR (IX+d)",
    "OR (IX+d)",
    "CP (IX+d)",
];
const SHIFT_R: [&str; 8] = ["RLC r", "RRC r", "RL r", "RR r", "SLA r", "SRA r", "SLL r", "SRL r"];
const SHIFT_HL: [&str; 8] = [
    "RLC (HL)", "RRC (HL)", "RL (HL)", "RR (HL)", "SLA (HL)", "SRA (HL)", "SLL (HL)", "SRL (HL)",
];
const SHIFT_IX: [&str; 8] = [
    "RLC (IX+d)",
    "RRC (IX+d)",
    "RL (IX+d)",
    "RR (IX+d)",
    "SLA (IX+d)",
    "SRA (IX+d)",
    "SLL (IX+d)",
    "SRL (IX+d)",
];

fn main_table() -> Table {
    let mut b = Builder::new();

    // x = 0
    b.set(0x00, "NOP", Operand::None, fixed(4), load::nop);
    b.set(0x08, "EX AF,AF'", Operand::None, fixed(4), exchange::ex_af);
    b.set(0x10, "DJNZ e", Operand::Displacement, branch(13, 8), control::djnz);
    b.set(0x18, "JR e", Operand::Displacement, fixed(12), control::jr);
    for (op, mnemonic) in [(0x20, "JR NZ,e"), (0x28, "JR Z,e"), (0x30, "JR NC,e"), (0x38, "JR C,e")] {
        b.set(op, mnemonic, Operand::Displacement, branch(12, 7), control::jr_cc);
    }
    for p in 0..4u8 {
        let row = p << 4;
        b.set(row | 0x01, "LD rr,nn", Operand::Word, fixed(10), load::ld_rp_nn);
        b.set(row | 0x03, "INC rr", Operand::None, fixed(6), arith::inc_rp);
        b.set(row | 0x09, "ADD HL,rr", Operand::None, fixed(11), arith::add_hl_rp);
        b.set(row | 0x0B, "DEC rr", Operand::None, fixed(6), arith::dec_rp);
    }
    b.set(0x02, "LD (BC),A", Operand::None, fixed(7), load::ld_ind_a);
    b.set(0x12, "LD (DE),A", Operand::None, fixed(7), load::ld_ind_a);
    b.set(0x0A, "LD A,(BC)", Operand::None, fixed(7), load::ld_a_ind);
    b.set(0x1A, "LD A,(DE)", Operand::None, fixed(7), load::ld_a_ind);
    b.set(0x22, "LD (nn),HL", Operand::Word, fixed(16), load::ld_nn_hl);
    b.set(0x2A, "LD HL,(nn)", Operand::Word, fixed(16), load::ld_hl_nn);
    b.set(0x32, "LD (nn),A", Operand::Word, fixed(13), load::ld_nn_a);
    b.set(0x3A, "LD A,(nn)", Operand::Word, fixed(13), load::ld_a_nn);
    for y in 0..8u8 {
        let row = y << 3;
        if y == 6 {
            b.set(0x34, "INC (HL)", Operand::None, fixed(11), arith::inc_r);
            b.set(0x35, "DEC (HL)", Operand::None, fixed(11), arith::dec_r);
            b.set(0x36, "LD (HL),n", Operand::Byte, fixed(10), load::ld_r_n);
        } else {
            b.set(row | 0x04, "INC r", Operand::None, fixed(4), arith::inc_r);
            b.set(row | 0x05, "DEC r", Operand::None, fixed(4), arith::dec_r);
            b.set(row | 0x06, "LD r,n", Operand::Byte, fixed(7), load::ld_r_n);
        }
    }
    for (op, mnemonic) in [(0x07, "RLCA"), (0x0F, "RRCA"), (0x17, "RLA"), (0x1F, "RRA")] {
        b.set(op, mnemonic, Operand::None, fixed(4), bits::rotate_acc);
    }
    b.set(0x27, "DAA", Operand::None, fixed(4), arith::daa);
    b.set(0x2F, "CPL", Operand::None, fixed(4), arith::cpl);
    b.set(0x37, "SCF", Operand::None, fixed(4), arith::scf);
    b.set(0x3F, "CCF", Operand::None, fixed(4), arith::ccf);

    // x = 1
    for op in 0x40..=0x7Fu8 {
        let (y, z) = ((op >> 3) & 7, op & 7);
        match (y, z) {
            (6, 6) => b.set(op, "HALT", Operand::None, fixed(4), control::halt),
            (6, _) => b.set(op, "LD (HL),r", Operand::None, fixed(7), load::ld_r_r),
            (_, 6) => b.set(op, "LD r,(HL)", Operand::None, fixed(7), load::ld_r_r),
            _ => b.set(op, "LD r,r'", Operand::None, fixed(4), load::ld_r_r),
        }
    }

    // x = 2
    for op in 0x80..=0xBFu8 {
        let y = usize::from((op >> 3) & 7);
        if op & 7 == 6 {
            b.set(op, ALU_HL[y], Operand::None, fixed(7), arith::alu_a_r);
        } else {
            b.set(op, ALU_R[y], Operand::None, fixed(4), arith::alu_a_r);
        }
    }

    // x = 3
    for y in 0..8u8 {
        let row = 0xC0 | (y << 3);
        b.set(row, "RET cc", Operand::None, branch(11, 5), stack::ret_cc);
        b.set(row | 0x02, "JP cc,nn", Operand::Word, fixed(10), control::jp_cc);
        b.set(row | 0x04, "CALL cc,nn", Operand::Word, branch(17, 10), stack::call_cc);
        b.set(row | 0x06, ALU_N[usize::from(y)], Operand::Byte, fixed(7), arith::alu_a_n);
        b.set(row | 0x07, "RST p", Operand::None, fixed(11), stack::rst);
    }
    for p in 0..4u8 {
        let row = 0xC0 | (p << 4);
        b.set(row | 0x01, "POP rr", Operand::None, fixed(10), stack::pop_rp);
        b.set(row | 0x05, "PUSH rr", Operand::None, fixed(11), stack::push_rp);
    }
    b.set(0xC9, "RET", Operand::None, fixed(10), stack::ret);
    b.set(0xD9, "EXX", Operand::None, fixed(4), exchange::exx);
    b.set(0xE9, "JP (HL)", Operand::None, fixed(4), control::jp_hl);
    b.set(0xF9, "LD SP,HL", Operand::None, fixed(6), load::ld_sp_hl);
    b.set(0xC3, "JP nn", Operand::Word, fixed(10), control::jp);
    b.set(0xE3, "EX (SP),HL", Operand::None, fixed(19), exchange::ex_sp_hl);
    b.set(0xEB, "EX DE,HL", Operand::None, fixed(4), exchange::ex_de_hl);
    b.set(0xF3, "DI", Operand::None, fixed(4), control::di);
    b.set(0xFB, "EI", Operand::None, fixed(4), control::ei);
    b.set(0xCD, "CALL nn", Operand::Word, fixed(17), stack::call);

    b.finish()
}

fn cb_table() -> Table {
    let mut b = Builder::new();
    for op in 0..=0xFFu8 {
        let y = usize::from((op >> 3) & 7);
        let memory = op & 7 == 6;
        match (op >> 6, memory) {
            (0, false) => b.set(op, SHIFT_R[y], Operand::None, fixed(8), bits::shift),
            (0, true) => b.set(op, SHIFT_HL[y], Operand::None, fixed(15), bits::shift),
            (1, false) => b.set(op, "BIT b,r", Operand::None, fixed(8), bits::bit),
            (1, true) => b.set(op, "BIT b,(HL)", Operand::None, fixed(12), bits::bit),
            (2, false) => b.set(op, "RES b,r", Operand::None, fixed(8), bits::res),
            (2, true) => b.set(op, "RES b,(HL)", Operand::None, fixed(15), bits::res),
            (_, false) => b.set(op, "SET b,r", Operand::None, fixed(8), bits::set),
            (_, true) => b.set(op, "SET b,(HL)", Operand::None, fixed(15), bits::set),
        }
    }
    b.finish()
}

fn index_table() -> Table {
    let mut b = Builder::new();

    for p in 0..4u8 {
        b.set((p << 4) | 0x09, "ADD IX,rr", Operand::None, fixed(15), arith::add_hl_rp);
    }
    b.set(0x21, "LD IX,nn", Operand::Word, fixed(14), load::ld_rp_nn);
    b.set(0x22, "LD (nn),IX", Operand::Word, fixed(20), load::ld_nn_hl);
    b.set(0x2A, "LD IX,(nn)", Operand::Word, fixed(20), load::ld_hl_nn);
    b.set(0x23, "INC IX", Operand::None, fixed(10), arith::inc_rp);
    b.set(0x2B, "DEC IX", Operand::None, fixed(10), arith::dec_rp);
    b.set(0x34, "INC (IX+d)", Operand::Displacement, fixed(23), arith::inc_r);
    b.set(0x35, "DEC (IX+d)", Operand::Displacement, fixed(23), arith::dec_r);
    b.set(0x36, "LD (IX+d),n", Operand::DisplacementByte, fixed(19), load::ld_r_n);

    for r in [0u8, 1, 2, 3, 4, 5, 7] {
        b.set(0x46 | (r << 3), "LD r,(IX+d)", Operand::Displacement, fixed(19), load::ld_r_r);
        b.set(0x70 | r, "LD (IX+d),r", Operand::Displacement, fixed(19), load::ld_r_r);
    }
    for y in 0..8u8 {
        b.set(
            0x86 | (y << 3),
            ALU_IX[usize::from(y)],
            Operand::Displacement,
            fixed(19),
            arith::alu_a_r,
        );
    }

    b.set(0xE1, "POP IX", Operand::None, fixed(14), stack::pop_rp);
    b.set(0xE5, "PUSH IX", Operand::None, fixed(15), stack::push_rp);
    b.set(0xE3, "EX (SP),IX", Operand::None, fixed(23), exchange::ex_sp_hl);
    b.set(0xE9, "JP (IX)", Operand::None, fixed(8), control::jp_hl);
    b.set(0xF9, "LD SP,IX", Operand::None, fixed(10), load::ld_sp_hl);

    b.finish()
}

/// Only the documented `(IX+d)` forms (z = 6).
fn index_cb_table() -> Table {
    let mut b = Builder::new();
    for y in 0..8u8 {
        let row = (y << 3) | 6;
        b.set(row, SHIFT_IX[usize::from(y)], Operand::None, fixed(23), bits::shift);
        b.set(0x40 | row, "BIT b,(IX+d)", Operand::None, fixed(20), bits::bit);
        b.set(0x80 | row, "RES b,(IX+d)", Operand::None, fixed(23), bits::res);
        b.set(0xC0 | row, "SET b,(IX+d)", Operand::None, fixed(23), bits::set);
    }
    b.finish()
}

fn ed_table() -> Table {
    let mut b = Builder::new();

    for p in 0..4u8 {
        let row = 0x40 | (p << 4);
        b.set(row | 0x02, "SBC HL,rr", Operand::None, fixed(15), arith::sbc_hl_rp);
        b.set(row | 0x0A, "ADC HL,rr", Operand::None, fixed(15), arith::adc_hl_rp);
        b.set(row | 0x03, "LD (nn),rr", Operand::Word, fixed(20), load::ld_nn_rp);
        b.set(row | 0x0B, "LD rr,(nn)", Operand::Word, fixed(20), load::ld_rp_ind_nn);
    }
    b.set(0x44, "NEG", Operand::None, fixed(8), arith::neg);
    b.set(0x45, "RETN", Operand::None, fixed(14), stack::retn);
    b.set(0x4D, "RETI", Operand::None, fixed(14), stack::retn);
    b.set(0x46, "IM 0", Operand::None, fixed(8), control::im);
    b.set(0x56, "IM 1", Operand::None, fixed(8), control::im);
    b.set(0x5E, "IM 2", Operand::None, fixed(8), control::im);
    b.set(0x47, "LD I,A", Operand::None, fixed(9), load::ld_i_a);
    b.set(0x4F, "LD R,A", Operand::None, fixed(9), load::ld_r_a);
    b.set(0x57, "LD A,I", Operand::None, fixed(9), load::ld_a_i);
    b.set(0x5F, "LD A,R", Operand::None, fixed(9), load::ld_a_r);
    b.set(0x67, "RRD", Operand::None, fixed(18), bits::rrd);
    b.set(0x6F, "RLD", Operand::None, fixed(18), bits::rld);

    b.set(0xA0, "LDI", Operand::None, fixed(16), block::ldi);
    b.set(0xA8, "LDD", Operand::None, fixed(16), block::ldd);
    b.set(0xB0, "LDIR", Operand::None, branch(21, 16), block::ldir);
    b.set(0xB8, "LDDR", Operand::None, branch(21, 16), block::lddr);
    b.set(0xA1, "CPI", Operand::None, fixed(16), block::cpi);
    b.set(0xA9, "CPD", Operand::None, fixed(16), block::cpd);
    b.set(0xB1, "CPIR", Operand::None, branch(21, 16), block::cpir);
    b.set(0xB9, "CPDR", Operand::None, branch(21, 16), block::cpdr);

    b.finish()
}

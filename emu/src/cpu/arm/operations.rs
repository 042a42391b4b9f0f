use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::{
    AIKind, ArithmeticOpResult, ArmModeAluInstr, Kind, PsrOpKind, shift,
};
use crate::cpu::arm::instructions::{
    ArmModeMultiplyLongVariant, ArmModeMultiplyVariant, SingleDataTransferKind,
    SingleDataTransferOffsetInfo,
};
use crate::cpu::arm::mode::ArmModeOpcode;
use crate::cpu::arm7tdmi::{Arm7tdmi, HalfwordTransferKind};
use crate::cpu::cpu_modes::Mode;
use crate::cpu::flags::{
    HalfwordDataTransferOffsetKind, Indexing, LoadStoreKind, Offsetting, OperandKind,
    ReadWriteKind, ShiftKind,
};
use crate::cpu::psr::CpuState;
use crate::cpu::registers::REG_PC;

use super::alu_instruction::PsrKind;

pub const SIZE_OF_INSTRUCTION: u32 = 4;

impl Arm7tdmi {
    /// Executes a data processing (ALU) instruction.
    ///
    /// # Panics
    ///
    /// Panics if register index conversion fails.
    pub fn data_processing(
        &mut self,
        op_code: ArmModeOpcode, // FIXME: This parameter will be remove after change `psr_transfer`.
        alu_instruction: ArmModeAluInstr,
        set_conditions: bool,
        op_kind: OperandKind,
        rn: u32,
        destination: u32,
    ) {
        let offset = match rn {
            // if Rn is R15(PC) we need to offset its value because of
            // instruction pipelining
            REG_PC => Self::get_pc_offset_alu(op_kind, op_code.get_bit(4)),
            _ => 0,
        };
        let op1 = self.registers.register_at(rn.try_into().unwrap()) + offset;

        let op2 = self.get_operand(
            alu_instruction,
            set_conditions,
            op_kind,
            op_code.get_bits(0..=11),
        );

        match alu_instruction {
            ArmModeAluInstr::And => {
                self.and(destination.try_into().unwrap(), op1, op2, set_conditions);
            }
            ArmModeAluInstr::Eor => {
                self.eor(destination.try_into().unwrap(), op1, op2, set_conditions);
            }
            ArmModeAluInstr::Sub => {
                self.sub(destination.try_into().unwrap(), op1, op2, set_conditions);
            }
            ArmModeAluInstr::Rsb => {
                self.rsb(destination.try_into().unwrap(), op1, op2, set_conditions);
            }
            ArmModeAluInstr::Add => {
                self.add(destination.try_into().unwrap(), op1, op2, set_conditions);
            }
            ArmModeAluInstr::Adc => {
                self.adc(destination.try_into().unwrap(), op1, op2, set_conditions);
            }
            ArmModeAluInstr::Sbc => {
                self.sbc(destination.try_into().unwrap(), op1, op2, set_conditions);
            }
            ArmModeAluInstr::Rsc => {
                self.rsc(destination.try_into().unwrap(), op1, op2, set_conditions);
            }
            ArmModeAluInstr::Tst => self.tst(op1, op2),
            ArmModeAluInstr::Teq => self.teq(op1, op2),
            ArmModeAluInstr::Cmp => self.cmp(op1, op2),
            ArmModeAluInstr::Cmn => self.cmn(op1, op2),
            ArmModeAluInstr::Orr => {
                self.orr(destination.try_into().unwrap(), op1, op2, set_conditions);
            }
            ArmModeAluInstr::Mov => {
                self.mov(destination.try_into().unwrap(), op2, set_conditions);
            }
            ArmModeAluInstr::Bic => {
                self.bic(destination.try_into().unwrap(), op1, op2, set_conditions);
            }
            ArmModeAluInstr::Mvn => {
                self.mvn(destination.try_into().unwrap(), op2, set_conditions);
            }
        }

        if set_conditions && destination == REG_PC {
            // We move current SPSR into the CPSR.

            assert!(
                !(self.cpsr.mode() == Mode::User),
                "S=1 and Rd=0xF is forbidden in User mode"
            );

            // We store the current spsr in a temp variable because `swap_mode` would overwrite it.
            // We need to call `swap_mode` because we need to swap banked registers.
            let current_spsr = self.spsr;

            // Try to get the mode from SPSR. If it's invalid (e.g., BIOS wrote 0),
            // we skip the mode swap and just copy the CPSR value.
            // The CPU will be in an undefined state, but we won't panic.
            let spsr_value: u32 = current_spsr.into();
            if let Ok(spsr_mode) = Mode::try_from(spsr_value & 0b11111) {
                self.swap_mode(spsr_mode);
            } else {
                tracing::warn!(
                    "SPSR has invalid mode bits (0b{:05b}), skipping mode swap",
                    spsr_value & 0b11111
                );
            }

            self.cpsr = current_spsr;
        }

        // Test instructions do not modify destination so we don't flush pipeline even if
        // destination == R15
        if !matches!(
            alu_instruction,
            ArmModeAluInstr::Teq
                | ArmModeAluInstr::Cmn
                | ArmModeAluInstr::Cmp
                | ArmModeAluInstr::Tst
        ) && destination == REG_PC
        {
            self.flush_pipeline();
        }
    }

    /// Executes a PSR transfer instruction (MRS/MSR).
    ///
    /// # Panics
    ///
    /// Panics if R15 is used as source/destination register.
    pub fn psr_transfer(&mut self, op_kind: PsrOpKind, psr_kind: PsrKind) {
        // Accessing SPSR in User/System mode has unpredictable behavior on real hardware
        // Most implementations return CPSR instead
        let effective_psr_kind = if matches!(self.cpsr.mode(), Mode::System | Mode::User)
            && psr_kind == PsrKind::Spsr
        {
            tracing::warn!(
                "Attempting to access SPSR in User/System mode at PC=0x{:08X}, returning CPSR instead",
                self.registers.program_counter().wrapping_sub(8)
            );
            PsrKind::Cpsr
        } else {
            psr_kind
        };

        match op_kind {
            PsrOpKind::Mrs {
                destination_register,
            } => {
                assert!(
                    destination_register != REG_PC,
                    "PSR transfer should not use R15 as source/destination"
                );

                let psr = match effective_psr_kind {
                    PsrKind::Cpsr => self.cpsr,
                    PsrKind::Spsr => self.spsr,
                };

                self.registers
                    .set_register_at(destination_register.try_into().unwrap(), psr.into());
            }
            PsrOpKind::Msr { source_register } => {
                assert!(
                    source_register != REG_PC,
                    "PSR transfer should not use R15 as source/destination"
                );

                let rm = self
                    .registers
                    .register_at(source_register.try_into().unwrap());

                let current_mode = self.cpsr.mode();

                // If we're modifying CPSR and changing modes, swap banked registers FIRST
                // before updating CPSR, otherwise swap_mode will see we're already in the new mode
                if effective_psr_kind == PsrKind::Cpsr && current_mode != Mode::User {
                    let new_mode_bits = rm.get_bits(0..=4);
                    if let Ok(new_mode) = Mode::try_from(new_mode_bits)
                        && current_mode != new_mode
                    {
                        self.swap_mode(new_mode);
                    }
                }

                {
                    let psr = match effective_psr_kind {
                        PsrKind::Cpsr => &mut self.cpsr,
                        PsrKind::Spsr => &mut self.spsr,
                    };

                    // Setting flags
                    psr.set_sign_flag(rm.get_bit(31));
                    psr.set_zero_flag(rm.get_bit(30));
                    psr.set_carry_flag(rm.get_bit(29));
                    psr.set_overflow_flag(rm.get_bit(28));

                    // In User mode we can only set the flags so we don't touch the other bits
                    if current_mode != Mode::User {
                        psr.set_irq_disable(rm.get_bit(7));
                        psr.set_fiq_disable(rm.get_bit(6));

                        // Documentation says that software should never touch T (state) bit
                        // Should we set it? I guess software are written in order to not switch this bit
                        // but who knows?
                        if psr.state_bit() != rm.get_bit(5) {
                            tracing::warn!(
                                "Changing state bit (arm/thumb) in MSR instruction. This should not happen."
                            );
                        }
                        psr.set_state_bit(rm.get_bit(5));
                    }
                }

                // If modifying SPSR, update mode bits using set_mode_raw
                if effective_psr_kind == PsrKind::Spsr {
                    // If we're modifying SPSR we're sure we're not in System|User (checked before)
                    // We use `set_mode_raw` since the BIOS sometimes writes 0 in the SPSR.
                    self.spsr.set_mode_raw(rm.get_bits(0..=4));
                } else if effective_psr_kind == PsrKind::Cpsr && current_mode != Mode::User {
                    // For CPSR, set the mode bits directly (swap was already done above)
                    self.cpsr.set_mode_raw(rm.get_bits(0..=4));
                }
            }
            PsrOpKind::MsrFlg {
                operand,
                field_mask,
            } => {
                let op = match operand {
                    crate::cpu::arm::alu_instruction::AluSecondOperandInfo::Register {
                        shift_op: _,
                        shift_kind: _,
                        register,
                    } => self.registers.register_at(register.try_into().unwrap()),
                    crate::cpu::arm::alu_instruction::AluSecondOperandInfo::Immediate {
                        base,
                        shift,
                    } => base.rotate_right(shift),
                };
                let current_mode = self.cpsr.mode();

                // field_mask bits: bit 0 = control (0-7), bit 1 = extension (8-15),
                //                   bit 2 = status (16-23), bit 3 = flags (24-31)

                // If we're modifying CPSR control field (mode bits), swap banked registers FIRST
                if effective_psr_kind == PsrKind::Cpsr
                    && field_mask & 0b0001 != 0
                    && current_mode != Mode::User
                {
                    let new_mode_bits = op.get_bits(0..=4);
                    if let Ok(new_mode) = Mode::try_from(new_mode_bits)
                        && current_mode != new_mode
                    {
                        self.swap_mode(new_mode);
                    }
                }

                let psr = match effective_psr_kind {
                    PsrKind::Cpsr => &mut self.cpsr,
                    PsrKind::Spsr => &mut self.spsr,
                };

                // Update fields based on field_mask
                if field_mask & 0b1000 != 0 {
                    // Flags field (bits 24-31)
                    psr.set_sign_flag(op.get_bit(31));
                    psr.set_zero_flag(op.get_bit(30));
                    psr.set_carry_flag(op.get_bit(29));
                    psr.set_overflow_flag(op.get_bit(28));
                }

                if field_mask & 0b0001 != 0 && current_mode != Mode::User {
                    // Control field (bits 0-7): mode bits, IRQ/FIQ disable, state bit
                    psr.set_irq_disable(op.get_bit(7));
                    psr.set_fiq_disable(op.get_bit(6));

                    if psr.state_bit() != op.get_bit(5) {
                        tracing::warn!(
                            "Changing state bit (arm/thumb) in MSR instruction. This should not happen."
                        );
                    }
                    psr.set_state_bit(op.get_bit(5));

                    // Set mode bits
                    if effective_psr_kind == PsrKind::Spsr {
                        psr.set_mode_raw(op.get_bits(0..=4));
                    } else if effective_psr_kind == PsrKind::Cpsr {
                        // For CPSR, mode bits were already swapped above
                        psr.set_mode_raw(op.get_bits(0..=4));
                    }
                }

                // Extension and status fields (bits 8-23) are reserved/unused on ARM7TDMI
            }
        }
    }

    pub fn shift_operand(
        &mut self,
        alu_instruction: ArmModeAluInstr,
        s: bool,
        shift_kind: ShiftKind,
        shift_amount: u32,
        rm: u32,
    ) -> u32 {
        let result = shift(shift_kind, shift_amount, rm, self.cpsr.carry_flag());

        // If the instruction is a logical ALU instruction and S is set we set the carry flag
        if alu_instruction.kind() == AIKind::Logical && s {
            self.cpsr.set_carry_flag(result.carry);
        }

        result.result
    }

    /// Gets the second operand for an ALU instruction.
    ///
    /// # Panics
    ///
    /// Panics if register index conversion fails.
    pub fn get_operand(
        &mut self,
        alu_instruction: ArmModeAluInstr,
        s: bool,
        i: OperandKind,
        op2: u32,
    ) -> u32 {
        match i {
            // we get the operand from a register and then we shift it
            OperandKind::Register => {
                // bits [0-3] 2nd Operand Register (R0..R15) (including PC=R15)
                let rm = op2.get_bits(0..=3);
                // bit [4] - is Shift by Register Flag (0=Immediate, 1=Register)
                let r = op2.get_bit(4);
                let offset = match rm {
                    // if Rm is R15(PC) we need to offset its value because of
                    // instruction pipelining
                    REG_PC => Self::get_pc_offset_alu(i, r),
                    _ => 0,
                };
                let rm = self.registers.register_at(rm.try_into().unwrap()) + offset;
                let shift_kind = op2.get_bits(5..=6).into();

                let shift_amount = if r {
                    // the shift amount is read from Rs
                    // bits [11-8] - Shift register (R0-R14) - only lower 8bit 0-255 used
                    let rs = op2.get_bits(8..=11);
                    let rs = self.registers.register_at(rs.try_into().unwrap()) & 0xFF;
                    // If shift is taken from register and the value is 0 Rm is directly used as operand
                    if rs == 0 {
                        return rm;
                    }

                    rs
                } else {
                    // the shift amount is in the instruction
                    // bits [7-11] - Shift amount
                    op2.get_bits(7..=11)
                };

                self.shift_operand(alu_instruction, s, shift_kind, shift_amount, rm)
            }
            OperandKind::Immediate => {
                // bits [7-0] are the immediate value
                let imm = op2.get_bits(0..=7);
                // bit [11-8] are the rotate amount (multiplied by 2 to get actual rotation)
                let rotate_amount = op2.get_bits(8..=11) * 2;

                if rotate_amount == 0 {
                    // No rotation, carry flag not affected
                    imm
                } else {
                    // Use shift_operand to handle rotation and carry flag update for logical operations
                    self.shift_operand(alu_instruction, s, ShiftKind::Ror, rotate_amount, imm)
                }
            }
        }
    }

    /// Returns the offset that has to be applied to the value read by `PC`
    /// in the case of data processing (ALU) instruction.
    ///
    /// This is needed because when the instruction at address `X` is executing,
    /// PC points to `X+8` because of pipelining. If we need to read the shift
    /// amount from register (`i` is `False` and `r` is `True`) the instruction
    /// takes an additional cycle, thus `PC` points to `X+12`.
    ///
    /// PC is by default at `X+8` when executing the instruction `X` so we return 4 or 0
    ///
    /// # Arguments
    ///
    /// * `i` - A boolean value representing whether the 2nd operand is immediate or not
    /// * `r` - A boolean value representing whether the shift amount is to be taken from register or not
    pub(crate) fn get_pc_offset_alu(i: OperandKind, r: bool) -> u32 {
        if i == OperandKind::Register && r {
            4
        } else {
            0
        }
    }

    pub fn and(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let result = rn & op2;

        self.registers.set_register_at(rd, result);

        if s {
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag(result.get_bit(31));
        }
    }

    /// Rotate Right rd by the value in rs, store the result in rd and set condition codes.
    pub fn ror(&mut self, rd: usize, rs: u32) {
        self.shift_by_register(ShiftKind::Ror, rd, rs);
    }

    /// Logical Shift Left rd by the value in rs, store the result in rd and set condition codes.
    pub fn lsl(&mut self, rd: usize, rs: u32) {
        self.shift_by_register(ShiftKind::Lsl, rd, rs);
    }

    /// Logical Shift Right rd by the value in rs, store the result in rd and set condition codes.
    pub fn lsr(&mut self, rd: usize, rs: u32) {
        self.shift_by_register(ShiftKind::Lsr, rd, rs);
    }

    /// Arithmetic Shift Right rd by the value in rs, store the result in rd and set condition codes.
    pub fn asr(&mut self, rd: usize, rs: u32) {
        self.shift_by_register(ShiftKind::Asr, rd, rs);
    }

    /// Shared register-specified-shift path for the Thumb ALU-operations format (and ARM's
    /// shift-by-register Operand2): a shift amount of 0 leaves Rd and the carry flag untouched
    /// other than refreshing N/Z, matching the "Rs = 0" special case in the ARM7TDMI manual.
    fn shift_by_register(&mut self, kind: ShiftKind, rd: usize, rs: u32) {
        let rs = rs & 0xFF;
        let rd_value = self.registers.register_at(rd);
        if rs != 0 {
            let r = shift(kind, rs, rd_value, self.cpsr.carry_flag());
            self.registers.set_register_at(rd, r.result);
            self.cpsr.set_zero_flag(r.result == 0);
            self.cpsr.set_sign_flag(r.result.get_bit(31));
            self.cpsr.set_carry_flag(r.carry);
        } else {
            self.cpsr.set_zero_flag(rd_value == 0);
            self.cpsr.set_sign_flag(rd_value.get_bit(31));
        }
    }

    pub fn adc(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let carry: u32 = self.cpsr.carry_flag().into();

        let first_op_result = Self::add_inner_op(rn, op2);
        let second_op_result = Self::add_inner_op(first_op_result.result, carry);

        let result_op = ArithmeticOpResult {
            result: second_op_result.result,
            carry: first_op_result.carry || second_op_result.carry,
            overflow: first_op_result.overflow || second_op_result.overflow,
            sign: second_op_result.sign,
            zero: second_op_result.zero,
        };

        self.registers.set_register_at(rd, result_op.result);

        if s {
            self.cpsr.set_flags(&result_op);
        }
    }

    pub fn sbc(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        // SBC computes: Rd = Rn - Op2 - NOT(Carry)
        // where NOT(Carry) = 0 if carry is set, 1 if carry is clear
        let not_carry = u32::from(!self.cpsr.carry_flag());

        // Calculate: Rn - Op2 - NOT(C)
        // Use u64 to properly detect carry/borrow
        let rn_64 = rn as u64;
        let op2_64 = op2 as u64;
        let not_carry_64 = not_carry as u64;

        // Compute the subtraction
        let result_64 = rn_64.wrapping_sub(op2_64).wrapping_sub(not_carry_64);
        let result = result_64 as u32;

        // Carry flag: set if no borrow occurred (Rn >= Op2 + NOT(C))
        let carry_out = rn_64 >= (op2_64 + not_carry_64);

        // Overflow: for subtraction A - B, overflow occurs when:
        // - Operands have different signs (sign_A != sign_B)
        // - AND result has opposite sign from A (sign_result != sign_A)
        let sign_rn = rn.get_bit(31);
        let sign_op2 = op2.get_bit(31);
        let sign_result = result.get_bit(31);
        let overflow = (sign_rn != sign_op2) && (sign_result != sign_rn);

        self.registers.set_register_at(rd, result);

        if s {
            self.cpsr.set_carry_flag(carry_out);
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag(sign_result);
            self.cpsr.set_overflow_flag(overflow);
        }
    }

    fn rsc(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        self.sbc(rd, op2, rn, s);
    }

    pub fn eor(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let result = rn ^ op2;

        self.registers.set_register_at(rd, result);

        if s {
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag(result.get_bit(31));
        }
    }

    fn sub(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let sub_result = Self::sub_inner_op(rn, op2);

        self.registers.set_register_at(rd, sub_result.result);

        if s {
            self.cpsr.set_flags(&sub_result);
        }
    }

    fn rsb(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        self.sub(rd, op2, rn, s);
    }

    #[must_use]
    pub fn add_inner_op(first_op: u32, second_op: u32) -> ArithmeticOpResult {
        // we do the sum in 64bits so that the 32nd bit is the carry
        let result_and_carry = (first_op as u64).wrapping_add(second_op as u64);
        let result = result_and_carry as u32;

        let sign_op1 = first_op.get_bit(31);
        let sign_op2 = second_op.get_bit(31);
        let sign_r = result.get_bit(31);

        let carry = (result_and_carry & 0x0001_0000_0000) >> 32 == 1;

        // overflow only occurs when operands have the same sign and result has the opposite one
        let same_sign = sign_op1 == sign_op2;

        ArithmeticOpResult {
            result,
            carry,
            overflow: same_sign && (sign_op1 != sign_r),
            sign: result.get_bit(31),
            zero: result == 0,
        }
    }

    #[must_use]
    pub fn sub_inner_op(first_op: u32, second_op: u32) -> ArithmeticOpResult {
        let result = first_op.wrapping_sub(second_op);

        let sign_op1 = first_op.get_bit(31);
        let sign_op2 = second_op.get_bit(31);
        let sign_r = result.get_bit(31);

        let different_sign = sign_op1 != sign_op2;

        ArithmeticOpResult {
            result,
            carry: first_op >= second_op,
            overflow: different_sign && sign_op2 == sign_r,
            sign: result.get_bit(31),
            zero: result == 0,
        }
    }

    fn add(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let add_result = Self::add_inner_op(rn, op2);

        self.registers.set_register_at(rd, add_result.result);

        if s {
            self.cpsr.set_flags(&add_result);
        }
    }

    pub fn tst(&mut self, rn: u32, op2: u32) {
        let value = rn & op2;

        self.cpsr.set_sign_flag(value.is_bit_on(31));
        self.cpsr.set_zero_flag(value == 0);
    }

    /// Subtract the contents of rs from zero, and store the result in rd.
    pub fn neg(&mut self, rd: usize, rs: u32) {
        self.rsb(rd, rs, 0, true);
    }

    fn teq(&mut self, rn: u32, op2: u32) {
        let value = rn ^ op2;
        self.cpsr.set_sign_flag(value.is_bit_on(31));
        self.cpsr.set_zero_flag(value == 0);
    }

    pub fn cmp(&mut self, rn: u32, op2: u32) {
        let sub_result = Self::sub_inner_op(rn, op2);

        self.cpsr.set_flags(&sub_result);
    }

    pub fn cmn(&mut self, rn: u32, op2: u32) {
        let add_result = Self::add_inner_op(rn, op2);

        self.cpsr.set_flags(&add_result);
    }

    pub fn orr(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let result = rn | op2;

        self.registers.set_register_at(rd, result);

        if s {
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag(result.is_bit_on(31));
        }
    }

    pub fn mov(&mut self, rd: usize, op2: u32, s: bool) {
        self.registers.set_register_at(rd, op2);

        if s {
            self.cpsr.set_zero_flag(op2 == 0);
            self.cpsr.set_sign_flag(op2.get_bit(31));
        }
    }

    pub fn bic(&mut self, rd: usize, rn: u32, op2: u32, s: bool) {
        let result = rn & !op2;

        self.registers.set_register_at(rd, result);

        if s {
            self.cpsr.set_sign_flag(result.get_bit(31));
            self.cpsr.set_zero_flag(result == 0);
        }
    }

    pub fn mvn(&mut self, rd: usize, op2: u32, s: bool) {
        let result = !op2;

        self.registers.set_register_at(rd, result);

        if s {
            self.cpsr.set_sign_flag(result.get_bit(31));
            self.cpsr.set_zero_flag(result == 0);
        }
    }

    pub fn branch_and_exchange(&mut self, register: usize) {
        let mut rn = self.registers.register_at(register);
        let state: CpuState = rn.get_bit(0).into();

        self.cpsr.set_cpu_state(state);

        // Clear appropriate bits based on target mode
        match self.cpsr.cpu_state() {
            CpuState::Thumb => rn.set_bit_off(0),
            CpuState::Arm => {
                rn.set_bit_off(0);
                rn.set_bit_off(1);
            }
        }

        self.registers.set_program_counter(rn);
        self.flush_pipeline();
    }

    /// Executes a halfword/signed data transfer instruction.
    ///
    /// # Panics
    ///
    /// Panics if register index conversion fails.
    pub fn half_word_data_transfer(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        load_store_kind: LoadStoreKind,
        offset_kind: HalfwordDataTransferOffsetKind,
        base_register: u32,
        source_destination_register: u32,
        transfer_kind: HalfwordTransferKind,
    ) {
        let offset = match offset_kind {
            HalfwordDataTransferOffsetKind::Immediate { offset } => offset,
            HalfwordDataTransferOffsetKind::Register { register } => {
                self.registers.register_at(register as usize)
            }
        };

        let address = self
            .registers
            .register_at(base_register.try_into().unwrap());

        if base_register == REG_PC {
            assert!(
                !write_back,
                "WriteBack should not be specified when using R15 as base register."
            );

            assert!(!(indexing == Indexing::Post), "Post indexing uses write back but we're using R15 as base register.
                 Documentation says that when using R15 as base register WB should not be used. What should we do?");
        }

        let effective = match offsetting {
            Offsetting::Down => address.wrapping_sub(offset),
            Offsetting::Up => address.wrapping_add(offset),
        };

        // For STORE with writeback when Rd == Rn, save the value before writeback
        let store_value_before_writeback = if load_store_kind == LoadStoreKind::Store {
            if source_destination_register == REG_PC {
                let pc: u32 = self.registers.program_counter().try_into().unwrap();
                Some(pc + 4)
            } else {
                Some(
                    self.registers
                        .register_at(source_destination_register as usize),
                )
            }
        } else {
            None
        };

        // Perform writeback before load to match ARM behavior
        // This ensures that when Rd == Rn in a load, the loaded value is preserved
        let address: usize = match indexing {
            Indexing::Post => {
                // Post-indexing: use original address, then writeback
                self.registers
                    .set_register_at(base_register.try_into().unwrap(), effective);
                address.try_into().unwrap()
            }
            Indexing::Pre => {
                if write_back {
                    self.registers
                        .set_register_at(base_register.try_into().unwrap(), effective);
                }
                effective.try_into().unwrap()
            }
        };

        match load_store_kind {
            LoadStoreKind::Store => {
                // Use the value saved before writeback
                let value = store_value_before_writeback.unwrap();

                // On ARM7TDMI, SH=10 (LDRD) and SH=11 (STRD) with L=0 are undefined
                // Some games may hit these encodings. We treat them as STRH for compatibility.
                match transfer_kind {
                    HalfwordTransferKind::UnsignedHalfwords
                    | HalfwordTransferKind::SignedByte
                    | HalfwordTransferKind::SignedHalfwords => {
                        self.bus.write_half_word(address, value as u16);
                    }
                }
            }
            LoadStoreKind::Load => match transfer_kind {
                HalfwordTransferKind::UnsignedHalfwords => {
                    let v = self.read_half_word(address, false);
                    self.registers
                        .set_register_at(source_destination_register as usize, v);
                }
                HalfwordTransferKind::SignedByte => {
                    let v = self.bus.read_byte(address) as u32;
                    self.registers
                        .set_register_at(source_destination_register as usize, v.sign_extended(8));
                }
                HalfwordTransferKind::SignedHalfwords => {
                    let v = self.read_half_word(address, true);
                    self.registers
                        .set_register_at(source_destination_register as usize, v);
                }
            },
        }

        if load_store_kind == LoadStoreKind::Load && source_destination_register == REG_PC {
            self.flush_pipeline();
        }
    }

    pub(crate) fn single_data_transfer(
        &mut self,
        kind: SingleDataTransferKind,
        quantity: ReadWriteKind,
        write_back: bool,
        indexing: Indexing,
        rd: u32,
        base_register: u32,
        offset_info: SingleDataTransferOffsetInfo,
        offsetting: Offsetting,
    ) {
        let address = self
            .registers
            .register_at(base_register.try_into().unwrap());

        let amount = match offset_info {
            SingleDataTransferOffsetInfo::Immediate { offset } => offset,
            SingleDataTransferOffsetInfo::RegisterImmediate {
                shift_amount,
                shift_kind,
                reg_offset,
            } => {
                let v = self.registers.register_at(reg_offset.try_into().unwrap());
                let r = shift(shift_kind, shift_amount, v, self.cpsr.carry_flag());
                r.result
            }
        };

        let offset_address = match offsetting {
            Offsetting::Down => address.wrapping_sub(amount),
            Offsetting::Up => address.wrapping_add(amount),
        };

        // For STR with writeback when rd == base_register, we need to save the old value
        // before writeback modifies it
        let str_value_before_writeback = if kind == SingleDataTransferKind::Str {
            let mut v = self.registers.register_at(rd.try_into().unwrap());
            // If R15 we get the value of the current instruction + 4 (it is +8 already)
            if rd == REG_PC {
                v += 4;
            }
            Some(v)
        } else {
            None
        };

        let address = match indexing {
            Indexing::Post => {
                // write back is always true when using post indexing
                self.registers
                    .set_register_at(base_register as usize, offset_address);
                address as usize
            }
            Indexing::Pre => {
                if write_back {
                    self.registers
                        .set_register_at(base_register as usize, offset_address);
                }
                offset_address as usize
            }
        };

        match kind {
            SingleDataTransferKind::Ldr => match quantity {
                ReadWriteKind::Byte => {
                    let value = self.bus.read_byte(address) as u32;
                    self.registers
                        .set_register_at(rd.try_into().unwrap(), value);
                }
                ReadWriteKind::Word => {
                    let v = self.read_word(address);

                    self.registers.set_register_at(rd.try_into().unwrap(), v);
                }
            },
            SingleDataTransferKind::Str => {
                // Use the value saved before writeback
                let v = str_value_before_writeback.unwrap();
                match quantity {
                    ReadWriteKind::Byte => {
                        self.bus.write_byte(address, v as u8);
                    }
                    ReadWriteKind::Word => {
                        self.bus.write_word(address, v);
                    }
                }
            }
            SingleDataTransferKind::Pld => todo!("implement single data transfer operation"),
        }

        // If LDR and Rd == R15 we flush the pipeline
        if kind == SingleDataTransferKind::Ldr && rd == REG_PC {
            self.flush_pipeline();
        }
    }

    pub(crate) fn block_data_transfer(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        load_psr: bool,
        write_back: bool,
        load_store: LoadStoreKind,
        rn: u32,
        reg_list: u32,
    ) {
        let base_register = rn.try_into().unwrap();
        let memory_base = self.registers.register_at(base_register);
        let mut address: usize = memory_base.try_into().unwrap();

        let is_empty_list = reg_list == 0;
        let r15_in_list = reg_list.is_bit_on(15) || is_empty_list; // Empty list loads/stores R15
        let use_user_registers = load_psr && !r15_in_list;

        let transfer = match (load_store, use_user_registers) {
            (LoadStoreKind::Store, false) => {
                |arm: &mut Self, address: usize, reg_source: usize| {
                    let mut value = arm.registers.register_at(reg_source);

                    // If R15 we get the value of the current instruction + 4 (it is +8 already)
                    if reg_source == REG_PC.try_into().unwrap() {
                        value += 4;
                    }

                    arm.bus.write_word(address, value);
                }
            }
            (LoadStoreKind::Store, true) => {
                // STM with S bit and R15 not in list: Store user mode registers
                |arm: &mut Self, address: usize, reg_source: usize| {
                    let mut value = arm.read_user_register(reg_source);

                    // If R15 we get the value of the current instruction + 4 (it is +8 already)
                    if reg_source == REG_PC.try_into().unwrap() {
                        value += 4;
                    }

                    arm.bus.write_word(address, value);
                }
            }
            (LoadStoreKind::Load, false) => {
                |arm: &mut Self, address: usize, reg_destination: usize| {
                    let v = arm.bus.read_word(address);
                    arm.registers.set_register_at(reg_destination, v);
                }
            }
            (LoadStoreKind::Load, true) => {
                // LDM with S bit and R15 not in list: Load into user mode registers
                |arm: &mut Self, address: usize, reg_destination: usize| {
                    let v = arm.bus.read_word(address);
                    arm.write_user_register(reg_destination, v);
                }
            }
        };

        // When STM includes the base register with writeback,
        // the value stored depends on the base's position in the register list:
        // - If base is FIRST in register list (lowest numbered): store original value
        // - If base is NOT first in register list: store modified (writeback) value
        // We handle this by temporarily updating the base register before transfers if needed.
        let base_in_list = reg_list.is_bit_on(base_register as u8);
        let restore_base =
            if write_back && base_in_list && load_store == LoadStoreKind::Store && !is_empty_list {
                // final writeback
                let num_registers = reg_list.count_ones();
                let final_address = match offsetting {
                    Offsetting::Up => memory_base.wrapping_add(num_registers * 4),
                    Offsetting::Down => memory_base.wrapping_sub(num_registers * 4),
                };

                // Check if base is the first register in the register list (lowest numbered)
                // This is independent of transfer order
                let first_register_in_list =
                    (0..=15).find(|&i| reg_list.is_bit_on(i as u8)).unwrap();

                // If base is NOT first in register list, store the writeback value
                if first_register_in_list == base_register {
                    None
                } else {
                    self.registers.set_register_at(base_register, final_address);
                    Some(memory_base) // Remember to restore after
                }
            } else {
                None
            };

        // Handle empty register list: Load/Store R15 and adjust base by 0x40
        if is_empty_list {
            // For empty register list, R15 is transferred and base is adjusted by 0x40
            let transfer_address = match (indexing, offsetting) {
                (Indexing::Post, Offsetting::Up) => address, // Transfer at current, then add 0x40
                (Indexing::Post, Offsetting::Down) => address.wrapping_sub(0x3C), // Transfer at base-0x3C, final base-0x40
                (Indexing::Pre, Offsetting::Up) => address.wrapping_add(4), // Increment first, transfer, final base+0x40
                (Indexing::Pre, Offsetting::Down) => address.wrapping_sub(0x40), // Decrement to final, transfer
            };

            transfer(self, transfer_address, 15);

            // Update base by 0x40 total
            address = match offsetting {
                Offsetting::Up => memory_base.wrapping_add(0x40) as usize,
                Offsetting::Down => memory_base.wrapping_sub(0x40) as usize,
            };
        } else {
            self.exec_data_transfer(reg_list, indexing, &mut address, offsetting, transfer);
        }

        // Restore base register if we temporarily modified it
        if let Some(original_value) = restore_base {
            self.registers
                .set_register_at(base_register, original_value);
        }

        // Writeback: Update base register with final address
        // Exception: On LDM, if base is in register list, the loaded value takes precedence
        let skip_writeback = write_back && load_store == LoadStoreKind::Load && base_in_list;

        if write_back && !skip_writeback {
            self.registers
                .set_register_at(base_register, (address & 0xFFFF_FFFF) as u32);
        }

        // If LDM with S bit and R15 is in register list: Copy SPSR to CPSR (exception return)
        if load_store == LoadStoreKind::Load && load_psr && r15_in_list {
            let spsr = self.spsr;
            self.cpsr = spsr;
        }

        // If LDM and R15 is in register list we flush the pipeline
        if load_store == LoadStoreKind::Load && r15_in_list {
            self.flush_pipeline();
        }
    }

    fn exec_data_transfer<F>(
        &mut self,
        reg_list: u32,
        indexing: Indexing,
        address: &mut usize,
        offsetting: Offsetting,
        transfer: F,
    ) where
        F: Fn(&mut Self, usize, usize),
    {
        let alignment = 4; // Since are word, the alignment is 4.

        let change_address = |address: usize| match offsetting {
            Offsetting::Down => address.wrapping_sub(alignment),
            Offsetting::Up => address.wrapping_add(alignment),
        };

        // If we are decreasing we still want to store the lowest reg to the lowest
        // memory address. For this reason we reverse the loop order.
        let range_registers: Box<dyn Iterator<Item = u8>> = match offsetting {
            Offsetting::Down => Box::new((0..=15).rev()),
            Offsetting::Up => Box::new(0..=15),
        };

        for reg_source in range_registers {
            if reg_list.is_bit_on(reg_source) {
                if indexing == Indexing::Pre {
                    *address = change_address(*address);
                }

                transfer(self, *address, reg_source.into());

                if indexing == Indexing::Post {
                    *address = change_address(*address);
                }
            }
        }
    }

    /// Executes a branch instruction (B/BL).
    ///
    /// # Panics
    ///
    /// Panics if PC conversion fails.
    pub fn branch(&mut self, is_link: bool, offset: u32) {
        let offset = offset.sign_extended(26) as i32;
        let old_pc: u32 = self.registers.program_counter().try_into().unwrap();

        if is_link {
            self.registers
                .set_register_at(14, old_pc.wrapping_sub(SIZE_OF_INSTRUCTION));
        }

        let new_pc = old_pc as i32 + offset;
        self.registers.set_program_counter(new_pc as u32);

        self.flush_pipeline();
    }

    pub fn multiply(
        &mut self,
        mul_variant: ArmModeMultiplyVariant,
        set_condition_codes: bool,
        rd: u32,
        rn: u32,
        rs: u32,
        rm: u32,
    ) {
        match mul_variant {
            // Unsiged multiply (32-bit by 32-bit, bottom 32-bit result).
            ArmModeMultiplyVariant::Mul => {
                self.mul_or_mla(set_condition_codes, false, rd, rn, rs, rm);
            }
            // Unsiged multiply-accumulate (32-bit by 32-bit, bottom 32-bit accumulate and result).
            ArmModeMultiplyVariant::Mla => {
                self.mul_or_mla(set_condition_codes, true, rd, rn, rs, rm);
            }
        }
    }

    pub fn multiply_long(
        &mut self,
        mul_variant: ArmModeMultiplyLongVariant,
        set_condition_codes: bool,
        rdhi: u32,
        rdlo: u32,
        rs: u32,
        rm: u32,
    ) {
        match mul_variant {
            // Unsigned long multiply (32-bit by 32-bit, 64-bit result)
            ArmModeMultiplyLongVariant::Umull => {
                self.umull_or_umlal(set_condition_codes, false, rdhi, rdlo, rs, rm);
            }
            // Unsigned long multiply-accumulate (32-bit by 32-bit, 64-bit accumulate and result)
            ArmModeMultiplyLongVariant::Umlal => {
                self.umull_or_umlal(set_condition_codes, true, rdhi, rdlo, rs, rm);
            }
            // Signed long multiply (32-bit by 32-bit, 64-bit result)
            ArmModeMultiplyLongVariant::Smull => {
                self.smull_or_smlal(set_condition_codes, false, rdhi, rdlo, rs, rm);
            }
            // Signed multiply-accumulate (32-bit by 32-bit, 64-bit accumulate and result)
            ArmModeMultiplyLongVariant::Smlal => {
                self.smull_or_smlal(set_condition_codes, true, rdhi, rdlo, rs, rm);
            }
        }
    }

    pub fn mul_or_mla(
        &mut self,
        set_condition_codes: bool,
        does_accumulate: bool,
        rd: u32,
        rn: u32,
        rs: u32,
        rm: u32,
    ) {
        let rm_operand_value = self.registers.register_at(rm as usize);
        let rs_operand_value = self.registers.register_at(rs as usize);

        let (mut result, _) = rm_operand_value.overflowing_mul(rs_operand_value);
        if does_accumulate {
            let rn_register_value = self.registers.register_at(rn as usize);
            let (result_add, _) = result.overflowing_add(rn_register_value);
            result = result_add;
        }

        self.registers.set_register_at(rd as usize, result);

        if set_condition_codes {
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag(result.get_bit(31));
        }
    }

    pub fn umull_or_umlal(
        &mut self,
        set_condition_codes: bool,
        does_accumulate: bool,
        rdhi: u32,
        rdlo: u32,
        rs: u32,
        rm: u32,
    ) {
        let rm_operand_value = self.registers.register_at(rm as usize) as u64;
        let rs_operand_value = self.registers.register_at(rs as usize) as u64;

        let (mut result, _) = rm_operand_value.overflowing_mul(rs_operand_value);
        if does_accumulate {
            let rdhi_register_value = self.registers.register_at(rdhi as usize) as u64;
            let rdlo_register_value = self.registers.register_at(rdlo as usize) as u64;
            let rdhilo_register_value = rdhi_register_value << 32 | rdlo_register_value;
            let (result_add, _) = result.overflowing_add(rdhilo_register_value);
            result = result_add;
        }

        self.registers
            .set_register_at(rdlo as usize, result.get_bits(0..=31) as u32);
        self.registers
            .set_register_at(rdhi as usize, result.get_bits(32..=63) as u32);

        if set_condition_codes {
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag(result.get_bit(63));
        }
    }

    pub fn smull_or_smlal(
        &mut self,
        set_condition_codes: bool,
        does_accumulate: bool,
        rdhi: u32,
        rdlo: u32,
        rs: u32,
        rm: u32,
    ) {
        let rm_operand_value = self.registers.register_at(rm as usize);
        let rs_operand_value = self.registers.register_at(rs as usize);
        let rm_operand_value_sgn: i64 = (rm_operand_value as i32) as i64;
        let rs_operand_value_sgn: i64 = (rs_operand_value as i32) as i64;

        let (mut result_sgn, _) = rm_operand_value_sgn.overflowing_mul(rs_operand_value_sgn);
        if does_accumulate {
            let rdhi_register_value = self.registers.register_at(rdhi as usize) as u64;
            let rdlo_register_value = self.registers.register_at(rdlo as usize) as u64;
            let rdhilo_register_value = rdhi_register_value << 32 | rdlo_register_value;
            let rdhilo_register_value_sgn = rdhilo_register_value as i64;
            let (result_sgn_add, _) = result_sgn.overflowing_add(rdhilo_register_value_sgn);
            result_sgn = result_sgn_add;
        }

        let result = result_sgn as u64;
        self.registers
            .set_register_at(rdlo as usize, result.get_bits(0..=31) as u32);
        self.registers
            .set_register_at(rdhi as usize, result.get_bits(32..=63) as u32);

        if set_condition_codes {
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag(result.get_bit(63));
        }
    }
}

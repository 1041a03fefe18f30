//! JVM instruction set: named opcodes and operand widths.

pub const LDC: u8 = 0x12;
pub const LDC_W: u8 = 0x13;
pub const IINC: u8 = 0x84;
pub const TABLESWITCH: u8 = 0xaa;
pub const LOOKUPSWITCH: u8 = 0xab;
pub const INVOKEVIRTUAL: u8 = 0xb6;
pub const INVOKESPECIAL: u8 = 0xb7;
pub const INVOKESTATIC: u8 = 0xb8;
pub const INVOKEINTERFACE: u8 = 0xb9;
pub const NEW: u8 = 0xbb;
pub const ANEWARRAY: u8 = 0xbd;
pub const CHECKCAST: u8 = 0xc0;
pub const INSTANCEOF: u8 = 0xc1;
pub const WIDE: u8 = 0xc4;
pub const MULTIANEWARRAY: u8 = 0xc5;

/// Number of operand bytes following each opcode. Variable length
/// instructions (`tableswitch`, `lookupswitch`, `wide`) are listed as 0 and
/// must be decoded separately.
pub static OPERAND_WIDTHS: [u8; 256] = operand_widths();

const fn operand_widths() -> [u8; 256] {
    let mut widths = [0u8; 256];

    widths[0x10] = 1; // bipush
    widths[0x11] = 2; // sipush
    widths[0x12] = 1; // ldc
    widths[0x13] = 2; // ldc_w
    widths[0x14] = 2; // ldc2_w

    // iload, lload, fload, dload, aload
    let mut op = 0x15;
    while op <= 0x19 {
        widths[op] = 1;
        op += 1;
    }
    // istore, lstore, fstore, dstore, astore
    op = 0x36;
    while op <= 0x3a {
        widths[op] = 1;
        op += 1;
    }

    widths[IINC as usize] = 2;

    // ifeq .. if_acmpne, goto, jsr
    op = 0x99;
    while op <= 0xa8 {
        widths[op] = 2;
        op += 1;
    }
    widths[0xa9] = 1; // ret

    // getstatic, putstatic, getfield, putfield, invokevirtual, invokespecial, invokestatic
    op = 0xb2;
    while op <= 0xb8 {
        widths[op] = 2;
        op += 1;
    }
    widths[INVOKEINTERFACE as usize] = 4;
    widths[0xba] = 4; // invokedynamic
    widths[NEW as usize] = 2;
    widths[0xbc] = 1; // newarray
    widths[ANEWARRAY as usize] = 2;
    widths[CHECKCAST as usize] = 2;
    widths[INSTANCEOF as usize] = 2;
    widths[MULTIANEWARRAY as usize] = 3;
    widths[0xc6] = 2; // ifnull
    widths[0xc7] = 2; // ifnonnull
    widths[0xc8] = 4; // goto_w
    widths[0xc9] = 4; // jsr_w

    widths
}

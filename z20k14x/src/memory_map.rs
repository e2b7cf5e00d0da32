//! Base addresses of every register block.

pub const FLASH: u32 = 0x4002_0000;
pub const SCM: u32 = 0x4002_4000;
pub const SYSCTRL: u32 = 0x4004_8000;
pub const PMU: u32 = 0x4004_9000;
pub const SCC: u32 = 0x4006_4000;
pub const RTC: u32 = 0x4006_6000;

pub const CMU: [u32; 4] = [0x4006_8000, 0x4006_9000, 0x4006_a000, 0x4006_b000];

pub const PORT: [u32; 5] = [0x4004_a000, 0x4004_b000, 0x4004_c000, 0x4004_d000, 0x4004_e000];

pub const GPIO: [u32; 5] = [0x400f_f000, 0x400f_f040, 0x400f_f080, 0x400f_f0c0, 0x400f_f100];

pub const UART: [u32; 6] = [
    0x4006_c000,
    0x4006_d000,
    0x4006_e000,
    0x4006_f000,
    0x4007_0000,
    0x4007_1000,
];

pub const TIM: [u32; 4] = [0x4003_8000, 0x4003_9000, 0x4003_a000, 0x4003_b000];

pub const MCPWM: [u32; 2] = [0x4003_c000, 0x4003_d000];

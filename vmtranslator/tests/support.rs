//! A minimal Hack CPU simulator used only by integration tests, to check
//! genuine runtime invariants (stack discipline, call/return round-trip)
//! rather than just the shape of the emitted text.

use std::collections::HashMap;

enum Instr {
    A(Operand),
    C {
        dest: String,
        comp: String,
        jump: String,
    },
}

enum Operand {
    Value(i32),
    Symbol(String),
}

pub struct Simulator {
    ram: HashMap<i32, i32>,
    a: i32,
    d: i32,
}

impl Simulator {
    fn predefined(symbol: &str) -> Option<i32> {
        match symbol {
            "SP" => Some(0),
            "LCL" => Some(1),
            "ARG" => Some(2),
            "THIS" => Some(3),
            "THAT" => Some(4),
            "SCREEN" => Some(16384),
            "KBD" => Some(24576),
            _ if symbol.starts_with('R') && symbol[1..].parse::<i32>().is_ok() => {
                symbol[1..].parse().ok()
            }
            _ => None,
        }
    }

    fn parse(asm: &str) -> (Vec<Instr>, HashMap<String, usize>) {
        let mut labels: HashMap<String, usize> = HashMap::new();
        let mut raw: Vec<&str> = Vec::new();

        for line in asm.lines() {
            let line = line.find("//").map_or(line, |p| &line[..p]);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(stripped) = line.strip_prefix('(') {
                let name = stripped.trim_end_matches(')');
                labels.insert(name.to_string(), raw.len());
            } else {
                raw.push(line);
            }
        }

        let instructions = raw
            .into_iter()
            .map(|line| {
                if let Some(sym) = line.strip_prefix('@') {
                    let operand = sym
                        .parse::<i32>()
                        .map_or_else(|_| Operand::Symbol(sym.to_string()), Operand::Value);
                    Instr::A(operand)
                } else {
                    let (rest, jump) = line.split_once(';').map_or((line, ""), |(c, j)| (c, j));
                    let (dest, comp) = rest.split_once('=').map_or(("", rest), |(d, c)| (d, c));
                    Instr::C {
                        dest: dest.to_string(),
                        comp: comp.to_string(),
                        jump: jump.to_string(),
                    }
                }
            })
            .collect();

        (instructions, labels)
    }

    pub fn new() -> Self {
        Self {
            ram: HashMap::new(),
            a: 0,
            d: 0,
        }
    }

    fn read(&self, addr: i32) -> i32 {
        *self.ram.get(&addr).unwrap_or(&0)
    }

    fn write(&mut self, addr: i32, value: i32) {
        self.ram.insert(addr, value);
    }

    pub fn set(&mut self, addr: i32, value: i32) {
        self.write(addr, value);
    }

    pub fn get(&self, addr: i32) -> i32 {
        self.read(addr)
    }

    /// Runs `asm` to completion (falling off the last instruction), with a
    /// generous step ceiling as a safety net against an accidental loop.
    pub fn run(&mut self, asm: &str) {
        let (instructions, labels) = Self::parse(asm);
        let mut variables: HashMap<String, i32> = HashMap::new();
        let mut next_var = 16i32;

        let mut pc: usize = 0;
        let mut steps = 0usize;
        while pc < instructions.len() && steps < 200_000 {
            steps += 1;
            match &instructions[pc] {
                Instr::A(operand) => {
                    self.a = match operand {
                        Operand::Value(v) => *v,
                        Operand::Symbol(s) => {
                            if let Some(addr) = Self::predefined(s) {
                                addr
                            } else if let Some(&addr) = labels.get(s) {
                                addr as i32
                            } else if let Some(&addr) = variables.get(s) {
                                addr
                            } else {
                                let addr = next_var;
                                next_var += 1;
                                variables.insert(s.clone(), addr);
                                addr
                            }
                        }
                    };
                    pc += 1;
                }
                Instr::C { dest, comp, jump } => {
                    let m = self.read(self.a);
                    let value = match comp.as_str() {
                        "0" => 0,
                        "1" => 1,
                        "-1" => -1,
                        "D" => self.d,
                        "A" => self.a,
                        "M" => m,
                        "!D" => !self.d,
                        "!A" => !self.a,
                        "!M" => !m,
                        "-D" => -self.d,
                        "-A" => -self.a,
                        "-M" => -m,
                        "D+1" => self.d + 1,
                        "A+1" => self.a + 1,
                        "M+1" => m + 1,
                        "D-1" => self.d - 1,
                        "A-1" => self.a - 1,
                        "M-1" => m - 1,
                        "D+A" => self.d + self.a,
                        "D+M" => self.d + m,
                        "D-A" => self.d - self.a,
                        "D-M" => self.d - m,
                        "A-D" => self.a - self.d,
                        "M-D" => m - self.d,
                        "D&A" => self.d & self.a,
                        "D&M" => self.d & m,
                        "D|A" => self.d | self.a,
                        "D|M" => self.d | m,
                        other => panic!("unsupported comp `{other}`"),
                    };

                    if dest.contains('A') {
                        self.a = value;
                    }
                    if dest.contains('D') {
                        self.d = value;
                    }
                    if dest.contains('M') {
                        self.write(self.a, value);
                    }

                    let should_jump = match jump.as_str() {
                        "" => false,
                        "JGT" => value > 0,
                        "JEQ" => value == 0,
                        "JGE" => value >= 0,
                        "JLT" => value < 0,
                        "JNE" => value != 0,
                        "JLE" => value <= 0,
                        "JMP" => true,
                        other => panic!("unsupported jump `{other}`"),
                    };

                    pc = if should_jump { self.a as usize } else { pc + 1 };
                }
            }
        }
    }
}

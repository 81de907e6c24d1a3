// SPDX-License-Identifier: GPL-3.0-or-later

pub const RUN_BIN: &str = "run";

#[cfg(has_executable_true)]
#[allow(dead_code)]
pub const TRUE_PATH: &str = env!("TRUE_PATH");
#[cfg(has_executable_false)]
#[allow(dead_code)]
pub const FALSE_PATH: &str = env!("FALSE_PATH");
#[cfg(has_executable_shell)]
#[allow(dead_code)]
pub const SHELL_PATH: &str = env!("SHELL_PATH");
#[cfg(has_executable_make)]
#[allow(dead_code)]
pub const MAKE_PATH: &str = env!("MAKE_PATH");
#[cfg(has_executable_compiler_c)]
#[allow(dead_code)]
pub const COMPILER_C_PATH: &str = env!("COMPILER_C_PATH");

pub const PASS_COLORED: &str = "\x1b[1m\x1b[92m[PASS]\x1b[0m";
pub const FAIL_COLORED: &str = "\x1b[1m\x1b[91m[FAIL]\x1b[0m";

/// Public header of the scratch project.
#[allow(dead_code)]
pub const PROJECT_HEADER: &str = "\
#ifndef PROJECT_H
#define PROJECT_H

int add(int a, int b);
int sub(int a, int b);

#endif
";

#[allow(dead_code)]
pub const PROJECT_SOURCE: &str = "\
#include \"project.h\"

int add(int a, int b) { return a + b; }
int sub(int a, int b) { return a - b; }
";

/// The entry point, which must not be linked into the tests.
#[allow(dead_code)]
pub const PROJECT_MAIN: &str = "\
#include <stdio.h>
#include \"project.h\"

int main(void) {
    printf(\"%d\\n\", add(1, 2));
    return 0;
}
";

#[allow(dead_code)]
pub const PROJECT_MAKEFILE: &str = "\
all: build/project.o build/main.o

build/%.o: src/%.c include/project.h
\tmkdir -p build
\t$(CC) -Iinclude -c $< -o $@

.PHONY: all
";

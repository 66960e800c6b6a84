//! Snapshot coverage for the textual IR form (the `--emit-ir`/`build`
//! output): the exact instruction-per-line dump, both unoptimized and after
//! the three optimizer passes, for a handful of representative programs.

fn lower(source: &str) -> String {
    dragonc::compile(source, false)
        .expect("source should compile")
        .ir
        .dump()
}

fn lower_optimized(source: &str) -> String {
    dragonc::compile(source, true)
        .expect("source should compile")
        .ir
        .dump()
}

#[test]
fn snapshot_unoptimized_if_else() {
    let ir = lower(
        r#"
        func main() {
            int x = 1;
            if (x < 2) {
                print 1;
            } else {
                print 2;
            }
            return 0;
        }
        "#,
    );
    insta::assert_snapshot!(ir, @r#"
func main:
t0 = 1
x = t0
t1 = 2
t2 = x < t1
if t2 goto L_then_0
goto L_else_1
L_then_0:
t3 = 1
print t3
goto L_end_2
L_else_1:
t4 = 2
print t4
L_end_2:
t5 = 0
return t5
"#);
}

#[test]
fn snapshot_optimized_constant_arithmetic() {
    let ir = lower_optimized("func main() { print 1 + 2 * 3; return 0; }");
    insta::assert_snapshot!(ir, @r#"
func main:
print 7
return 0
"#);
}

#[test]
fn snapshot_unoptimized_recursive_call() {
    let ir = lower(
        r#"
        func fact(int n) {
            if (n <= 1) return 1;
            return n * fact(n - 1);
        }
        func main() {
            print fact(5);
            return 0;
        }
        "#,
    );
    insta::assert_snapshot!(ir, @r#"
func fact:
t0 = 1
t1 = n <= t0
if t1 goto L_then_0
goto L_else_1
L_then_0:
t2 = 1
return t2
goto L_end_2
L_else_1:
L_end_2:
t3 = 1
t4 = n - t3
param t4
t5 = call fact, 1
t6 = n * t5
return t6
func main:
t7 = 5
param t7
t8 = call fact, 1
print t8
t9 = 0
return t9
"#);
}

#[test]
fn snapshot_optimized_while_loop() {
    let ir = lower_optimized(
        r#"
        func main() {
            int i = 0;
            int s = 0;
            while (i < 5) {
                s = s + i;
                i = i + 1;
            }
            print s;
            return s;
        }
        "#,
    );
    insta::assert_snapshot!(ir, @r#"
func main:
i = 0
s = 0
L_while_begin_0:
t3 = i < 5
if t3 goto L_while_body_1
goto L_while_end_2
L_while_body_1:
t4 = s + i
s = t4
t6 = i + 1
i = t6
goto L_while_begin_0
L_while_end_2:
print s
return s
"#);
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tplc_parser::{detect_syntax_version, parse};

// A medium-size modern body with most constructs
const MODERN_SOURCE: &str = r#"
// Reactive state
$count! = 0
$step: number = 1
$items! = []
$user: { name: string, age?: number } = { name: "Ada", age: 36 }
$total! = $count * $step
$summary! = `${$user.name} has ${$items.length} items`

// Handlers
$increment = () => {
    $count = $count + $step
}

$reset = () => $count = 0

$load = async (url: string) => {
    $items = await fetch(url).then(r => r.json())
}

$visible = $items
    .filter(item => item.active)
    .map(item => item.id)

$greet(name: string): string {
    return "Hi " + name
}

class Cart {
    constructor(private owner: string, readonly currency = "EUR") {}

    $lines! = []

    $add(line) {
        this.lines.push(line)
    }

    async $checkout() {
        return await submit(this.lines)
    }
}
"#;

// The same size of legacy code
const LEGACY_SOURCE: &str = r#"
var count = 0;
var items = [];

function increment() {
    count = count + 1;
    render();
}

function render() {
    $('#count').text(count);
}

$(document).ready(function () {
    $('#inc').on('click', increment);
});
"#;

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_modern_medium", |b| {
        b.iter(|| {
            let output = parse(black_box(MODERN_SOURCE));
            black_box(output.ok());
        });
    });

    c.bench_function("parse_legacy_medium", |b| {
        b.iter(|| {
            let output = parse(black_box(LEGACY_SOURCE));
            black_box(output.ok());
        });
    });
}

fn bench_detect(c: &mut Criterion) {
    c.bench_function("detect_syntax_version", |b| {
        b.iter(|| black_box(detect_syntax_version(black_box(MODERN_SOURCE))));
    });
}

criterion_group!(benches, bench_parse, bench_detect);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use autoquizzer_core::answer::FallbackPicker;
use autoquizzer_core::model::{AnswerSource, ModelAnswer, OptionLetter, Question, Quiz};
use autoquizzer_core::scoring::{score_model_answers, score_user_choices};

fn make_quiz() -> Quiz {
    Quiz {
        topic: "Capybaras".into(),
        questions: OptionLetter::ALL
            .iter()
            .cycle()
            .take(5)
            .enumerate()
            .map(|(i, &right)| Question {
                question: format!("Question {i}?"),
                options: vec![
                    "a. one".into(),
                    "b. two".into(),
                    "c. three".into(),
                    "d. four".into(),
                ],
                right_option: right,
            })
            .collect(),
    }
}

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");
    let quiz = make_quiz();

    let answers: Vec<ModelAnswer> = [OptionLetter::A, OptionLetter::C, OptionLetter::C, OptionLetter::D, OptionLetter::B]
        .into_iter()
        .map(|letter| ModelAnswer {
            letter,
            source: AnswerSource::Model,
            reply: letter.to_string(),
        })
        .collect();

    let choices: Vec<Option<String>> = vec![
        Some("a. one".into()),
        Some("b".into()),
        None,
        Some("d. four".into()),
        Some("a. one".into()),
    ];

    group.bench_function("model_answers", |b| {
        b.iter(|| score_model_answers(black_box(&quiz), black_box(&answers)))
    });

    group.bench_function("user_choices", |b| {
        b.iter(|| score_user_choices(black_box(&quiz), black_box(&choices)))
    });

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let picker = FallbackPicker::seeded(7);

    group.bench_function("valid_letter", |b| {
        b.iter(|| picker.normalize(black_box("c")))
    });

    group.bench_function("fallback", |b| {
        b.iter(|| picker.normalize(black_box("I think the answer is C")))
    });

    group.finish();
}

criterion_group!(benches, bench_scoring, bench_normalize);
criterion_main!(benches);

//! 미리 정의된 답변

use rand::seq::SliceRandom;

pub const RESPONSES: [&str; 13] = [
    "¡Hola! ¿En qué puedo ayudarte hoy?",
    "Muy bien, pero sabes que los gatos tienen 32 músculos en cada oreja.",
    "No me importa porque yo sé que los osos polares son zurdos.",
    "A qué tú no sabías que las abejas tienen 5 ojos.",
    "¿Sabías que los elefantes son los únicos animales que no pueden saltar?",
    "A mí me gusta saber que las jirafas tienen la lengua de color azul oscuro.",
    "Te va a parecer increible pero ¿sabías que los pingüinos tienen rodillas?",
    "¿Sabías que los cocodrilos no pueden sacar la lengua?",
    "Hoy no tengo ganas de trabajar pero te diré que los flamencos son rosados por comer camarones.",
    "No sé de qué me hablas pero yo sé que los perros son capaces de oír sonidos a 225 metros de distancia.",
    "Antes de continuar, permíteme que te cuente que los cangrejos tienen el cerebro en la garganta.",
    "Qué pereza, pero te diré que los ratones no pueden vomitar.",
    "Cuéntame algo que no sepa, como que las mariposas saborean con sus patas.",
];

/// 무작위 답변 하나 선택
pub fn pick() -> &'static str {
    RESPONSES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(RESPONSES[0])
}
